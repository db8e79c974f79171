use std::collections::BTreeMap;
use std::fmt::Debug;

use log::debug;

use crate::alphabet::FiniteAlphabet;
use crate::automata::graph::{Target, TerminalTag};
use crate::automata::machine::Machine;
use crate::errors::Error;

/// Unsigned types usable as dense-table state indices.
pub trait StateIx: Copy + Eq + Debug {
    const ZERO: Self;

    fn from_index(index: usize) -> Self;
    fn index(self) -> usize;

    /// Largest index the type can represent.
    fn max_index() -> usize;
}

macro_rules! state_ix {
    ($($ty:ty),*) => {$(
        impl StateIx for $ty {
            const ZERO: Self = 0;

            fn from_index(index: usize) -> Self {
                index as $ty
            }

            fn index(self) -> usize {
                self as usize
            }

            fn max_index() -> usize {
                <$ty>::MAX as usize
            }
        }
    )*};
}

state_ix!(u8, u16, u32, u64, usize);

/// One emitted token: its text, the state the machine was in after each
/// character, and the input index its first character came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexToken<T, S> {
    pub text: Vec<T>,
    pub states: Vec<S>,
    pub starting_index: u64,
}

/// Maximal-munch tokenizer over a compiled machine, backed by a dense
/// `states x alphabet` transition table.
///
/// State 0 is the delimiter state: "a token just ended here". Its row
/// mirrors the entry row, so the character that ended one token is
/// immediately re-applied as the first character of the next.
pub struct LexerTable<T: FiniteAlphabet, S: StateIx> {
    table: Vec<S>,
    n_states: usize,
    state: S,
    index: u64,
    current: LexToken<T, S>,
}

impl<T: FiniteAlphabet, S: StateIx> LexerTable<T, S> {
    pub fn new(machine: &Machine<T>) -> Result<LexerTable<T, S>, Error> {
        debug_assert!(!machine.has_epsilons());

        let nodes = machine.reachable_nodes();
        let n_states = nodes.len() + 1;
        if n_states - 1 > S::max_index() {
            return Err(Error::AlphabetOverflow {
                states: n_states,
                capacity: S::max_index().saturating_add(1),
            });
        }

        // Canonical numbering: delimiter is 0, reachable nodes take
        // 1..=len in traversal order, so the entry node is row 1.
        let mut index_of = BTreeMap::new();
        for (i, id) in nodes.iter().enumerate() {
            index_of.insert(*id, i + 1);
        }

        let mut table = vec![S::ZERO; n_states * T::SIZE];
        for id in &nodes {
            let row = index_of[id];
            let node = machine.node(*id);
            for (sym, target) in &node.next {
                let Target::Node(m) = target else { continue };
                // A transition from an accept node back to the entry is a
                // token boundary: commit and restart.
                let to = if node.tag == TerminalTag::End && *m == machine.entry() {
                    0
                } else {
                    index_of[m]
                };
                table[row * T::SIZE + sym.index()] = S::from_index(to);
            }
        }
        for col in 0..T::SIZE {
            table[col] = table[T::SIZE + col];
        }

        debug!(
            "lexer table built: {} states x {} symbols",
            n_states,
            T::SIZE
        );

        Ok(LexerTable {
            table,
            n_states,
            state: S::ZERO,
            index: 0,
            current: LexToken {
                text: vec![],
                states: vec![],
                starting_index: 0,
            },
        })
    }

    pub fn n_states(&self) -> usize {
        self.n_states
    }

    pub fn get(&self, state: S, input: &T) -> S {
        self.table[state.index() * T::SIZE + input.index()]
    }

    /// Process one character. A completed token cannot be detected until
    /// the character after it, so the caller must feed the alphabet's
    /// zero sentinel exactly once after the input to flush the last token.
    pub fn next<F>(&mut self, input: T, mut emit: F) -> Result<(), Error>
    where
        F: FnMut(&LexToken<T, S>),
    {
        if input.is_epsilon() {
            // End of input: commit whatever is in progress.
            emit(&self.current);
            self.clear_current();
        } else {
            self.state = self.get(self.state, &input);
            if self.state.index() == 0 {
                emit(&self.current);
                self.clear_current();

                self.state = self.get(S::ZERO, &input);
                if self.state.index() == 0 {
                    return Err(Error::LexFailure { index: self.index });
                }
            }
            self.current.text.push(input);
            self.current.states.push(self.state);
        }

        self.index += 1;
        Ok(())
    }

    /// Forget all progress, as if nothing had ever been fed in.
    pub fn reset(&mut self) {
        self.state = S::ZERO;
        self.index = 0;
        self.clear_current();
    }

    fn clear_current(&mut self) {
        self.current = LexToken {
            text: vec![],
            states: vec![],
            starting_index: self.index,
        };
    }
}
