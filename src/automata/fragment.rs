use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::alphabet::Alphabet;
use crate::automata::graph::{Arena, NodeId, Target, TerminalTag};

/// A partially constructed sub-automaton: an entry node plus the dangling
/// exits reachable from it, encoded as `Target::Pending` edges. Fragments
/// never own nodes; the arena does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment {
    pub entry: NodeId,
}

impl<T: Alphabet> Arena<T> {
    /// Concatenation: rewrite every dangling exit reachable from `from` to
    /// point at `to`. The visited set is seeded with `to` so the walk does
    /// not descend into the fragment being knitted on.
    pub fn knit(&mut self, from: NodeId, to: NodeId) {
        let mut visited = BTreeSet::new();
        visited.insert(to);
        visited.insert(from);
        let mut stack = vec![from];

        while let Some(cur) = stack.pop() {
            let mut follow = vec![];
            for target in self.nodes[cur].next.values_mut() {
                match *target {
                    Target::Pending => *target = Target::Node(to),
                    Target::Node(m) => follow.push(m),
                }
            }
            for m in follow {
                if visited.insert(m) {
                    stack.push(m);
                }
            }
        }
    }

    /// Alternation: merge the outgoing structure of `theirs` into `mine`,
    /// in place. Sharing is preserved where prefixes agree; where one
    /// branch stops and the other continues past a shared symbol, the
    /// node reached after that symbol gains an epsilon exit.
    pub fn add_as_suit(&mut self, mine: NodeId, theirs: NodeId) {
        let mut merging = BTreeSet::new();
        self.suit_merge(mine, theirs, &mut merging);
    }

    fn suit_merge(
        &mut self,
        mine: NodeId,
        theirs: NodeId,
        merging: &mut BTreeSet<(NodeId, NodeId)>,
    ) {
        // Constant-time cycle check; merging the same pair twice is a no-op.
        if !merging.insert((mine, theirs)) {
            return;
        }

        let edges: Vec<(T, Target)> = self.nodes[theirs]
            .next
            .iter()
            .map(|(sym, target)| (sym.clone(), *target))
            .collect();

        for (sym, other) in edges {
            match self.nodes[mine].next.get(&sym).copied() {
                // Symbol is new here: adopt the branch wholesale.
                None => {
                    self.nodes[mine].next.insert(sym, other);
                }
                // Both branches stop after this symbol.
                Some(Target::Pending) if other == Target::Pending => {}
                Some(Target::Node(m)) => match other {
                    // Both continue: merge the successors.
                    Target::Node(o) => self.suit_merge(m, o, merging),
                    // Theirs stops here: the node reached by consuming
                    // the symbol gains an exit.
                    Target::Pending => self.splice_epsilon(m, Target::Pending),
                },
                // Ours stops, theirs continues: adopt theirs'
                // continuation and give it the exit ours had.
                Some(Target::Pending) => {
                    if let Target::Node(o) = other {
                        self.nodes[mine].next.insert(sym, other);
                        self.splice_epsilon(o, Target::Pending);
                    }
                }
            }
        }
    }

    /// Walk the epsilon chain starting at `from` and hang `target` off
    /// its end. A chain already ending in a dangling exit is left alone.
    fn splice_epsilon(&mut self, from: NodeId, target: Target) {
        let eps = T::epsilon();
        let mut seen = BTreeSet::new();
        let mut cur = from;
        loop {
            if !seen.insert(cur) {
                return;
            }
            match self.nodes[cur].next.get(&eps) {
                Some(&Target::Node(next)) => cur = next,
                Some(&Target::Pending) => return,
                None => break,
            }
        }
        self.nodes[cur].next.insert(eps, target);
    }

    /// Rewrite the graph reachable from `entry` so that no edge carries
    /// epsilon. Driven by a worklist of all reachable nodes collected up
    /// front; each inner close either consumes an epsilon edge or leaves
    /// the graph unchanged.
    pub fn remove_epsilons(&mut self, entry: NodeId) {
        let mut all = BTreeSet::new();
        all.insert(entry);
        let mut queue = VecDeque::from([entry]);
        while let Some(cur) = queue.pop_front() {
            let targets: Vec<NodeId> = self.real_targets(cur);
            for m in targets {
                if all.insert(m) {
                    queue.push_back(m);
                }
            }
        }

        for node in all {
            self.close_node(node);
        }
    }

    /// Close one node: consume the epsilon chain hanging off it, fold the
    /// strongest downstream terminal tag back through the chain, then
    /// merge every chain member's outgoing edges into this node.
    fn close_node(&mut self, cur: NodeId) {
        let eps = T::epsilon();
        if !self.nodes[cur].next.contains_key(&eps) {
            return;
        }

        // Nodes reachable from `cur` via epsilon only, in walk order. The
        // walk stops on a cycle back into the chain.
        let mut closure = BTreeSet::new();
        let mut chain = vec![];
        let mut c = cur;
        loop {
            let target = match self.nodes[c].next.get(&eps) {
                Some(&Target::Node(t)) => t,
                _ => break,
            };
            if closure.contains(&target) {
                break;
            }
            closure.insert(target);
            chain.push(target);
            self.nodes[c].next.remove(&eps);
            c = target;
        }

        // Terminal tags propagate backward: each chain member, and then
        // the node being closed, absorbs the strongest tag epsilon-reachable
        // from it. Priority is End > Error > Scripting > Normal.
        let mut downstream = TerminalTag::Normal;
        for &member in chain.iter().rev() {
            let own = self.nodes[member].tag;
            self.nodes[member].tag = own.stronger(downstream);
            downstream = downstream.stronger(own);
        }
        let own = self.nodes[cur].tag;
        self.nodes[cur].tag = own.stronger(downstream);

        for member in closure {
            let edges: Vec<(T, Target)> = self.nodes[member]
                .next
                .iter()
                .map(|(sym, target)| (sym.clone(), *target))
                .collect();

            for (sym, target) in edges {
                match self.nodes[cur].next.get(&sym).copied() {
                    None => {
                        self.nodes[cur].next.insert(sym, target);
                    }
                    Some(existing) => {
                        // Self-loop guard: merging this edge would only
                        // re-add the loop we are standing on.
                        if existing == Target::Node(cur) && target == Target::Node(member) {
                            continue;
                        }
                        let Target::Node(start) = existing else {
                            continue;
                        };
                        self.splice_epsilon(start, target);
                        self.close_node(start);
                    }
                }
            }
        }
    }

    /// Deep copy of the subgraph reachable from `entry`. Dangling exits
    /// translate to dangling exits.
    pub fn duplicate(&mut self, entry: NodeId) -> NodeId {
        let mut mapping: BTreeMap<NodeId, NodeId> = BTreeMap::new();
        let mut queue = VecDeque::from([entry]);

        while let Some(cur) = queue.pop_front() {
            if mapping.contains_key(&cur) {
                continue;
            }
            let tag = self.nodes[cur].tag;
            let copy = self.create_node();
            self.nodes[copy].tag = tag;
            mapping.insert(cur, copy);
            for m in self.real_targets(cur) {
                queue.push_back(m);
            }
        }

        let originals: Vec<NodeId> = mapping.keys().copied().collect();
        for old in originals {
            let edges: Vec<(T, Target)> = self.nodes[old]
                .next
                .iter()
                .map(|(sym, target)| (sym.clone(), *target))
                .collect();
            let new = mapping[&old];
            for (sym, target) in edges {
                let translated = match target {
                    Target::Pending => Target::Pending,
                    Target::Node(m) => Target::Node(mapping[&m]),
                };
                self.nodes[new].next.insert(sym, translated);
            }
        }

        mapping[&entry]
    }

    fn real_targets(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes[id]
            .next
            .values()
            .filter_map(|target| match target {
                Target::Node(m) => Some(*m),
                Target::Pending => None,
            })
            .collect()
    }
}
