use std::collections::{BTreeSet, VecDeque};
use std::fmt;

use crate::alphabet::Alphabet;
use crate::automata::compiler::Compiler;
use crate::automata::graph::{Arena, Node, NodeId, Target, TerminalTag};
use crate::errors::Error;
use crate::executor::Cursor;

/// A finalized, epsilon-free automaton. The machine owns every node its
/// compile allocated (reachable or not) and is immutable once built;
/// per-match state lives in a `Cursor`, so one machine can serve any
/// number of concurrent matches.
#[derive(Debug)]
pub struct Machine<T: Alphabet> {
    nodes: Vec<Node<T>>,
    entry: NodeId,
    /// Nodes the machine admits to owning. The closure rewrite strands
    /// nodes; purging drops them from this view without freeing them.
    live: BTreeSet<NodeId>,
}

impl<T: Alphabet> Machine<T> {
    pub fn compile(pattern: &[T]) -> Result<Machine<T>, Error> {
        Compiler::new().compile(pattern)
    }

    pub(crate) fn finish(arena: Arena<T>, entry: NodeId) -> Machine<T> {
        let mut machine = Machine {
            nodes: arena.into_nodes(),
            entry,
            live: BTreeSet::new(),
        };
        machine.purge();
        machine
    }

    fn purge(&mut self) {
        self.live = self.reachable_nodes().into_iter().collect();
    }

    pub fn entry(&self) -> NodeId {
        self.entry
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node<T> {
        &self.nodes[id]
    }

    /// Number of nodes in the machine's view of itself.
    pub fn node_count(&self) -> usize {
        self.live.len()
    }

    /// All reachable nodes, breadth-first from the entry.
    pub fn reachable_nodes(&self) -> Vec<NodeId> {
        let mut seen = BTreeSet::new();
        let mut order = vec![self.entry];
        seen.insert(self.entry);
        let mut queue = VecDeque::from([self.entry]);

        while let Some(cur) = queue.pop_front() {
            for target in self.nodes[cur].next.values() {
                if let Target::Node(m) = target {
                    if seen.insert(*m) {
                        order.push(*m);
                        queue.push_back(*m);
                    }
                }
            }
        }

        order
    }

    /// True while any reachable edge still carries epsilon; a finalized
    /// machine reports false.
    pub fn has_epsilons(&self) -> bool {
        self.reachable_nodes()
            .into_iter()
            .any(|id| self.nodes[id].next.keys().any(|sym| sym.is_epsilon()))
    }

    pub fn cursor(&self) -> Cursor<T> {
        Cursor::new(self)
    }

    /// Reset-and-run convenience: true iff the input drives a fresh
    /// cursor into the accept state.
    pub fn is_match<I>(&self, input: I) -> bool
    where
        I: IntoIterator<Item = T>,
    {
        self.cursor().run(input, false) == TerminalTag::End
    }

    /// Terminal tags of every live node that carries one, for diagnostics.
    pub fn terminal_nodes(&self) -> Vec<(NodeId, TerminalTag)> {
        self.live
            .iter()
            .filter(|id| self.nodes[**id].tag != TerminalTag::Normal)
            .map(|id| (*id, self.nodes[*id].tag))
            .collect()
    }

    fn node_names(&self) -> Vec<(NodeId, String)> {
        let mut names = vec![];
        for id in self.reachable_nodes() {
            let name = if id == self.entry {
                "IN".to_string()
            } else if self.nodes[id].tag == TerminalTag::End {
                format!("E{}", names.len())
            } else {
                format!("q{}", names.len())
            };
            names.push((id, name));
        }
        names
    }

    /// GraphViz rendering of the machine. Structural fidelity only; the
    /// output carries no semantic contract.
    pub fn to_dot(&self, title: &str) -> String {
        use std::fmt::Write;

        let mut out = String::new();
        let _ = writeln!(out, "digraph machine {{");
        let _ = writeln!(out, "\tlabelloc=\"t\";");
        let _ = writeln!(out, "\tlabel=\"{}\";", title);
        let _ = writeln!(out, "\trankdir=LR;");
        let _ = writeln!(out, "\tnode [shape=circle];");

        let names: Vec<(NodeId, String)> = self
            .reachable_nodes()
            .into_iter()
            .enumerate()
            .map(|(i, id)| (id, format!("n{}", i)))
            .collect();
        let name_of = |id: NodeId| -> &str {
            names
                .iter()
                .find(|(n, _)| *n == id)
                .map(|(_, s)| s.as_str())
                .unwrap_or("?")
        };

        for (id, name) in &names {
            let label = if *id == self.entry {
                if self.nodes[*id].tag == TerminalTag::End {
                    "BegEnd"
                } else {
                    "Beg"
                }
            } else if self.nodes[*id].tag == TerminalTag::End {
                "End"
            } else {
                ""
            };
            let _ = writeln!(out, "\t{} [label=\"{}\"];", name, label);
        }

        for (id, name) in &names {
            for (sym, target) in &self.nodes[*id].next {
                let Target::Node(m) = target else { continue };
                if sym.is_epsilon() {
                    let _ = writeln!(out, "\t{} -> {} [label=<&epsilon;>];", name, name_of(*m));
                } else {
                    let _ = writeln!(out, "\t{} -> {} [label=\"{:?}\"];", name, name_of(*m), sym);
                }
            }
        }

        out.push_str("}\n");
        out
    }
}

impl<T: Alphabet> fmt::Display for Machine<T> {
    /// Plain-text transition dump: one `FROM -{sym}-> TO` line per edge.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let names = self.node_names();
        let name_of = |id: NodeId| -> &str {
            names
                .iter()
                .find(|(n, _)| *n == id)
                .map(|(_, s)| s.as_str())
                .unwrap_or("?")
        };

        for (id, name) in &names {
            for (sym, target) in &self.nodes[*id].next {
                let Target::Node(m) = target else { continue };
                if sym.is_epsilon() {
                    writeln!(f, "{} -{{EPS}}-> {}", name, name_of(*m))?;
                } else {
                    writeln!(f, "{} -{{{:?}}}-> {}", name, sym, name_of(*m))?;
                }
            }
        }
        Ok(())
    }
}
