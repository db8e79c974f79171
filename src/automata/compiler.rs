use log::debug;

use crate::alphabet::Alphabet;
use crate::automata::fragment::Fragment;
use crate::automata::graph::{Arena, Target, TerminalTag};
use crate::automata::machine::Machine;
use crate::errors::{Error, PatternErrorKind};

/// Compiles a pattern token vector into an executable machine: recursive
/// descent into an epsilon-NFA of fragments, then closure and a purge of
/// whatever the rewrite left unreachable.
pub struct Compiler<T: Alphabet> {
    arena: Arena<T>,
}

impl<T: Alphabet> Compiler<T> {
    pub fn new() -> Compiler<T> {
        Compiler {
            arena: Arena::new(),
        }
    }

    pub fn compile(mut self, pattern: &[T]) -> Result<Machine<T>, Error> {
        let fragment = self.compile_range(pattern, 0, pattern.len())?;

        // The accept node resolves every remaining dangling exit.
        let accept = self.arena.create_node();
        self.arena.node_mut(accept).tag = TerminalTag::End;
        self.arena.knit(fragment.entry, accept);

        debug!(
            "assembled epsilon-NFA for {}-token pattern: {} nodes",
            pattern.len(),
            self.arena.len()
        );

        self.arena.remove_epsilons(fragment.entry);

        let machine = Machine::finish(self.arena, fragment.entry);
        debug!(
            "machine finalized: {} reachable nodes",
            machine.reachable_nodes().len()
        );
        Ok(machine)
    }

    fn compile_range(&mut self, pattern: &[T], begin: usize, end: usize) -> Result<Fragment, Error> {
        let mut fragments: Vec<Fragment> = vec![];

        let mut i = begin;
        while i < end {
            let token = &pattern[i];

            if token.is_escape() {
                i += 1;
                if i >= end {
                    return Err(Error::MalformedPattern {
                        kind: PatternErrorKind::EscapeAtEnd,
                    });
                }
                fragments.push(self.literal(pattern[i].clone()));
            } else if token.is_subexpr_open() {
                i = self.compile_group(pattern, i, end, &mut fragments)?;
            } else if token.is_subexpr_close() {
                return Err(Error::MalformedPattern {
                    kind: PatternErrorKind::UnmatchedClose,
                });
            } else if token.is_wildcard() {
                fragments.push(self.literal(T::wildcard()));
            } else if token.is_optional() {
                // Entry gains an epsilon exit: the whole fragment is skippable.
                let prev = Self::previous(&fragments)?;
                self.arena
                    .node_mut(prev.entry)
                    .next
                    .insert(T::epsilon(), Target::Pending);
            } else if token.is_star() {
                // Loop the fragment onto its own entry, then make it skippable.
                let prev = Self::previous(&fragments)?;
                self.arena.knit(prev.entry, prev.entry);
                self.arena
                    .node_mut(prev.entry)
                    .next
                    .insert(T::epsilon(), Target::Pending);
            } else if token.is_plus() {
                // One required pass, then a looped copy. The copy must be a
                // deep one: looping the original in place would corrupt the
                // required head.
                let prev = Self::previous(&fragments)?;
                let copy = Fragment {
                    entry: self.arena.duplicate(prev.entry),
                };
                self.arena.knit(copy.entry, copy.entry);
                self.arena
                    .node_mut(copy.entry)
                    .next
                    .insert(T::epsilon(), Target::Pending);
                fragments.push(copy);
            } else {
                fragments.push(self.literal(token.clone()));
            }

            i += 1;
        }

        // An empty slice (empty pattern, empty alternation branch) matches
        // only the empty sequence: one node whose sole exit is epsilon.
        if fragments.is_empty() {
            let entry = self.arena.create_node();
            self.arena
                .node_mut(entry)
                .next
                .insert(T::epsilon(), Target::Pending);
            return Ok(Fragment { entry });
        }

        let combined = fragments[0];
        for fragment in &fragments[1..] {
            self.arena.knit(combined.entry, fragment.entry);
        }

        Ok(combined)
    }

    /// Scan a parenthesized group starting at `open`, split it on its
    /// top-level disjunctions, compile each slice and union them pairwise.
    /// Returns the index of the closing token.
    fn compile_group(
        &mut self,
        pattern: &[T],
        open: usize,
        end: usize,
        fragments: &mut Vec<Fragment>,
    ) -> Result<usize, Error> {
        let mut depth = 1usize;
        let mut delims = vec![open];
        let mut i = open + 1;

        let close = loop {
            if i >= end {
                return Err(Error::MalformedPattern {
                    kind: PatternErrorKind::UnmatchedOpen,
                });
            }
            let token = &pattern[i];
            if token.is_subexpr_open() {
                depth += 1;
            } else if token.is_disjunction() {
                if depth == 1 {
                    delims.push(i);
                }
            } else if token.is_subexpr_close() {
                depth -= 1;
                if depth == 0 {
                    delims.push(i);
                    break i;
                }
            }
            i += 1;
        };

        let mut branches = vec![];
        for pair in delims.windows(2) {
            branches.push(self.compile_range(pattern, pair[0] + 1, pair[1])?);
        }

        let merged = branches[0];
        for branch in &branches[1..] {
            self.arena.add_as_suit(merged.entry, branch.entry);
        }

        fragments.push(merged);
        Ok(close)
    }

    fn literal(&mut self, token: T) -> Fragment {
        let entry = self.arena.create_node();
        self.arena.node_mut(entry).next.insert(token, Target::Pending);
        Fragment { entry }
    }

    fn previous(fragments: &[Fragment]) -> Result<Fragment, Error> {
        fragments.last().copied().ok_or(Error::MalformedPattern {
            kind: PatternErrorKind::DanglingQuantifier,
        })
    }
}
