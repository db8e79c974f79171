use std::collections::BTreeMap;
use std::fmt;

use crate::alphabet::{Alphabet, FiniteAlphabet};
use crate::automata::machine::Machine;
use crate::errors::Error;
use crate::lexer::{LexerTable, StateIx};

/// Single-byte alphabet with the traditional regex metacharacters. The
/// zero byte is the epsilon value, so patterns and inputs must not
/// contain NUL.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ByteToken(pub u8);

impl fmt::Debug for ByteToken {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0.is_ascii_graphic() || self.0 == b' ' {
            write!(f, "{}", self.0 as char)
        } else {
            write!(f, "\\x{:02x}", self.0)
        }
    }
}

impl Alphabet for ByteToken {
    fn is_subexpr_open(&self) -> bool {
        self.0 == b'('
    }

    fn is_subexpr_close(&self) -> bool {
        self.0 == b')'
    }

    fn is_disjunction(&self) -> bool {
        self.0 == b'|'
    }

    fn is_wildcard(&self) -> bool {
        self.0 == b'.'
    }

    fn is_optional(&self) -> bool {
        self.0 == b'?'
    }

    fn is_star(&self) -> bool {
        self.0 == b'*'
    }

    fn is_plus(&self) -> bool {
        self.0 == b'+'
    }

    fn is_escape(&self) -> bool {
        self.0 == b'\\'
    }

    fn wildcard() -> ByteToken {
        ByteToken(b'.')
    }

    fn epsilon() -> ByteToken {
        ByteToken(0)
    }

    fn is_epsilon(&self) -> bool {
        self.0 == 0
    }
}

impl FiniteAlphabet for ByteToken {
    const SIZE: usize = 256;

    fn index(&self) -> usize {
        self.0 as usize
    }
}

/// The familiar regex surface over the generic engine.
pub struct Regex {
    machine: Machine<ByteToken>,
}

impl Regex {
    pub fn new(pattern: &str) -> Result<Regex, Error> {
        let tokens: Vec<ByteToken> = pattern.bytes().map(ByteToken).collect();
        Ok(Regex {
            machine: Machine::compile(&tokens)?,
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.machine.is_match(text.bytes().map(ByteToken))
    }

    pub fn machine(&self) -> &Machine<ByteToken> {
        &self.machine
    }

    pub fn lexer<S: StateIx>(&self) -> Result<LexerTable<ByteToken, S>, Error> {
        LexerTable::new(&self.machine)
    }
}

/// Named rewrite bank applied to pattern strings before compilation.
/// Ships with `\d`, `\w` and `\s` spelled out as explicit unions, since
/// the engine itself has no character classes.
pub struct Substitutions {
    bank: BTreeMap<String, String>,
}

impl Substitutions {
    pub fn new() -> Substitutions {
        let mut subs = Substitutions {
            bank: BTreeMap::new(),
        };
        subs.register("\\d", "(0|1|2|3|4|5|6|7|8|9)");
        subs.register(
            "\\w",
            "(a|b|c|d|e|f|g|h|i|j|k|l|m|n|o|p|q|r|s|t|u|v|w|x|y|z|\
             A|B|C|D|E|F|G|H|I|J|K|L|M|N|O|P|Q|R|S|T|U|V|W|X|Y|Z)",
        );
        subs.register("\\s", "( |\t|\n)");
        subs
    }

    /// Register a rewrite. The value itself goes through the bank first,
    /// so later patterns see its fully expanded form.
    pub fn register(&mut self, name: &str, value: &str) {
        let expanded = self.apply(value);
        self.bank.insert(name.to_string(), expanded);
    }

    /// Rewrite to a fixpoint: replace occurrences of registered names
    /// until none remain.
    pub fn apply(&self, pattern: &str) -> String {
        let mut out = pattern.to_string();
        let mut done = false;
        while !done {
            done = true;
            for (name, value) in &self.bank {
                if let Some(at) = out.find(name.as_str()) {
                    out.replace_range(at..at + name.len(), value);
                    done = false;
                }
            }
        }
        out
    }

    /// Expand and compile in one step.
    pub fn compile(&self, pattern: &str) -> Result<Regex, Error> {
        Regex::new(&self.apply(pattern))
    }
}

impl Default for Substitutions {
    fn default() -> Substitutions {
        Substitutions::new()
    }
}
