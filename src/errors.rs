use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternErrorKind {
    /// A group was opened but never closed.
    UnmatchedOpen,
    /// A close token with no matching open token.
    UnmatchedClose,
    /// `?`, `*` or `+` with nothing before it.
    DanglingQuantifier,
    /// The pattern ends in the middle of an escape.
    EscapeAtEnd,
}

impl fmt::Display for PatternErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            PatternErrorKind::UnmatchedOpen => "unmatched opening subexpression token".fmt(f),
            PatternErrorKind::UnmatchedClose => "unmatched closing subexpression token".fmt(f),
            PatternErrorKind::DanglingQuantifier => "quantifier with no preceding element".fmt(f),
            PatternErrorKind::EscapeAtEnd => "escape at end of pattern".fmt(f),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("malformed pattern: {kind}")]
    MalformedPattern { kind: PatternErrorKind },

    #[error("state index type holds {capacity} states but the machine needs {states}")]
    AlphabetOverflow { states: usize, capacity: usize },

    #[error("no token can start at input index {index}")]
    LexFailure { index: u64 },
}
