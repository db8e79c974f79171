/*!
Pattern matching over arbitrary token alphabets.

A pattern expressed in an extended regular-expression syntax is compiled
through a Thompson-style construction into an epsilon-NFA, rewritten
epsilon-free, and executed as a deterministic state machine, either one
token at a time or through a dense-table lexer that performs
maximal-munch tokenization over a character stream.
*/

pub mod alphabet;
pub mod automata;
pub mod errors;
pub mod executor;
pub mod lexer;
pub mod regex;

#[cfg(test)]
pub(crate) mod testing;

pub use crate::alphabet::{Alphabet, FiniteAlphabet};
pub use crate::automata::graph::TerminalTag;
pub use crate::automata::machine::Machine;
pub use crate::errors::{Error, PatternErrorKind};
pub use crate::executor::Cursor;
pub use crate::lexer::{LexToken, LexerTable, StateIx};
pub use crate::regex::{ByteToken, Regex, Substitutions};
