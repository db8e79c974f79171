//! Word-level test alphabet: patterns and inputs are whitespace-split
//! strings, with `$`-prefixed control tokens.

use crate::alphabet::Alphabet;

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct Word(pub String);

impl Alphabet for Word {
    fn is_subexpr_open(&self) -> bool {
        self.0 == "$("
    }

    fn is_subexpr_close(&self) -> bool {
        self.0 == "$)"
    }

    fn is_disjunction(&self) -> bool {
        self.0 == "$|"
    }

    fn is_wildcard(&self) -> bool {
        self.0 == "$."
    }

    fn is_optional(&self) -> bool {
        self.0 == "$?"
    }

    fn is_star(&self) -> bool {
        self.0 == "$*"
    }

    fn is_plus(&self) -> bool {
        self.0 == "$+"
    }

    fn is_escape(&self) -> bool {
        self.0 == "$\\"
    }

    fn wildcard() -> Word {
        Word("$.".to_string())
    }

    fn epsilon() -> Word {
        Word(String::new())
    }

    fn is_epsilon(&self) -> bool {
        self.0.is_empty()
    }
}

pub fn words(text: &str) -> Vec<Word> {
    text.split_whitespace().map(|w| Word(w.to_string())).collect()
}
