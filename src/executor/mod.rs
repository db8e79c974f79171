use log::trace;

use crate::alphabet::Alphabet;
use crate::automata::graph::{NodeId, Target, TerminalTag};
use crate::automata::machine::Machine;

/// Per-match state over a shared, immutable machine. Driving a cursor
/// never touches the machine, so any number of cursors can run over one
/// machine at the same time.
pub struct Cursor<'m, T: Alphabet> {
    machine: &'m Machine<T>,
    current: Option<NodeId>,
}

impl<'m, T: Alphabet> Cursor<'m, T> {
    pub fn new(machine: &'m Machine<T>) -> Cursor<'m, T> {
        Cursor {
            machine,
            current: Some(machine.entry()),
        }
    }

    /// Re-point the cursor at the entry node.
    pub fn reset(&mut self) {
        self.current = Some(self.machine.entry());
    }

    /// Terminal tag of the current node. A rejected cursor reports `Error`.
    pub fn state(&self) -> TerminalTag {
        match self.current {
            Some(id) => self.machine.node(id).tag,
            None => TerminalTag::Error,
        }
    }

    /// Advance by one token. Precedence is literal over wildcard over
    /// epsilon, and epsilon only when explicitly enabled; a finalized
    /// machine has none left to follow. Anything else sinks the cursor.
    pub fn step(&mut self, token: &T, allow_epsilons: bool) {
        let Some(cur) = self.current else {
            return;
        };
        let node = self.machine.node(cur);

        let target = if let Some(t) = node.next.get(token) {
            Some(*t)
        } else if let Some(t) = node.next.get(&T::wildcard()) {
            Some(*t)
        } else if allow_epsilons {
            node.next.get(&T::epsilon()).copied()
        } else {
            None
        };

        self.current = match target {
            Some(Target::Node(m)) => Some(m),
            _ => None,
        };
        trace!("step {:?}: node {:?}", token, self.current);
    }

    /// Feed a whole input sequence and report the resulting terminal tag.
    pub fn run<I>(&mut self, input: I, allow_epsilons: bool) -> TerminalTag
    where
        I: IntoIterator<Item = T>,
    {
        for token in input {
            self.step(&token, allow_epsilons);
        }
        self.state()
    }
}

#[cfg(test)]
mod test {
    use crate::regex::ByteToken;
    use crate::testing::{words, Word};
    use crate::{Machine, TerminalTag};
    use pretty_assertions::assert_eq;

    fn c(pattern: &str) -> Machine<ByteToken> {
        let tokens: Vec<ByteToken> = pattern.bytes().map(ByteToken).collect();
        Machine::compile(&tokens).expect("should be valid")
    }

    fn m(machine: &Machine<ByteToken>, input: &str) -> bool {
        machine.is_match(input.bytes().map(ByteToken))
    }

    #[test]
    fn byte_patterns() {
        let p = c("ab");
        assert_eq!(true, m(&p, "ab"));
        assert_eq!(false, m(&p, "abc"));
        assert_eq!(false, m(&p, "a"));

        let p = c("(a|b)");
        assert_eq!(true, m(&p, "a"));
        assert_eq!(true, m(&p, "b"));
        assert_eq!(false, m(&p, "ab"));

        let p = c("a*b");
        assert_eq!(true, m(&p, "b"));
        assert_eq!(true, m(&p, "ab"));
        assert_eq!(true, m(&p, "aaaaaaab"));
        assert_eq!(false, m(&p, "abb"));

        let p = c("a+b");
        assert_eq!(false, m(&p, "b"));
        assert_eq!(true, m(&p, "ab"));
        assert_eq!(true, m(&p, "aaaaaaab"));
        assert_eq!(false, m(&p, "abb"));

        let p = c("a?b");
        assert_eq!(true, m(&p, "b"));
        assert_eq!(true, m(&p, "ab"));
        assert_eq!(false, m(&p, "aaab"));
        assert_eq!(false, m(&p, "abb"));

        let p = c("a(bc|cd)*e");
        assert_eq!(true, m(&p, "ae"));
        assert_eq!(true, m(&p, "abce"));
        assert_eq!(true, m(&p, "acde"));
        assert_eq!(true, m(&p, "abccdbce"));
        assert_eq!(false, m(&p, "abccd"));
        assert_eq!(false, m(&p, "abccdef"));
    }

    #[test]
    fn streaming_run_reports_raw_tag() {
        let machine = c("ab");
        let mut cursor = machine.cursor();
        cursor.step(&ByteToken(b'a'), false);
        assert_eq!(cursor.state(), TerminalTag::Normal);
        cursor.step(&ByteToken(b'b'), false);
        assert_eq!(cursor.state(), TerminalTag::End);
        cursor.step(&ByteToken(b'x'), false);
        assert_eq!(cursor.state(), TerminalTag::Error);
        // a sunk cursor stays sunk
        cursor.step(&ByteToken(b'a'), false);
        assert_eq!(cursor.state(), TerminalTag::Error);

        cursor.reset();
        assert_eq!(cursor.state(), TerminalTag::Normal);
    }

    fn mw(machine: &Machine<Word>, input: &str) -> bool {
        machine.is_match(words(input))
    }

    fn cw(pattern: &str) -> Machine<Word> {
        Machine::compile(&words(pattern)).expect("should be valid")
    }

    #[test]
    fn word_sequential() {
        let p = cw("a b c");
        assert!(mw(&p, "a b c"));
        assert!(!mw(&p, "a c c"));
    }

    #[test]
    fn word_wildcard() {
        let p = cw("a $. b");
        assert!(mw(&p, "a a b"));
        assert!(mw(&p, "a b b"));
        assert!(!mw(&p, "a b"));
    }

    #[test]
    fn word_optional() {
        let p = cw("a b $? c");
        assert!(mw(&p, "a b c"));
        assert!(mw(&p, "a c"));
        assert!(!mw(&p, "a b b c"));
    }

    #[test]
    fn word_star() {
        let p = cw("a b $* c");
        assert!(mw(&p, "a c"));
        assert!(mw(&p, "a b c"));
        assert!(mw(&p, "a b b b b b c"));
        assert!(!mw(&p, "a b b b"));
        assert!(!mw(&p, "a b b b d"));
    }

    #[test]
    fn word_plus() {
        let p = cw("a b $+ c");
        assert!(mw(&p, "a b c"));
        assert!(mw(&p, "a b b b b b c"));
        assert!(!mw(&p, "a c"));
        assert!(!mw(&p, "a b b b"));
        assert!(!mw(&p, "a b b b d"));
    }

    #[test]
    fn word_wildcard_globs() {
        let star = cw("a $. $* b");
        assert!(mw(&star, "a c d e f g b"));
        assert!(mw(&star, "a b"));
        assert!(!mw(&star, "a c d e f g"));

        let plus = cw("a $. $+ b");
        assert!(mw(&plus, "a c d e f g b"));
        assert!(!mw(&plus, "a b"));
        assert!(!mw(&plus, "a c d e f g"));

        let optional = cw("a $. $? b");
        assert!(mw(&optional, "a c b"));
        assert!(mw(&optional, "a b"));
        assert!(!mw(&optional, "a c"));
    }

    #[test]
    fn word_subexpression() {
        let p = cw("a $( b c d $) z");
        assert!(mw(&p, "a b c d z"));
        assert!(!mw(&p, "a b z"));
    }

    #[test]
    fn word_branch_subexpression() {
        let p = cw("a $( b c $| d e $) z");
        assert!(mw(&p, "a b c z"));
        assert!(mw(&p, "a d e z"));
        assert!(!mw(&p, "a b c d e z"));

        let p = cw("a $( b c $| d e $| f g $| f h i j $)");
        assert!(mw(&p, "a b c"));
        assert!(mw(&p, "a d e"));
        assert!(mw(&p, "a f g"));
        assert!(mw(&p, "a f h i j"));
        assert!(!mw(&p, "a b c d e z"));
    }

    #[test]
    fn word_subexpression_globs() {
        let plus = cw("a $( b c d $) $+ z");
        assert!(mw(&plus, "a b c d b c d b c d z"));
        assert!(!mw(&plus, "a z"));

        let star = cw("a $( b c d $) $* z");
        assert!(mw(&star, "a b c d b c d b c d z"));
        assert!(mw(&star, "a z"));
        assert!(!mw(&star, "a b c d b z"));

        let optional = cw("a $( b c d $) $? z");
        assert!(mw(&optional, "a z"));
        assert!(mw(&optional, "a b c d z"));
        assert!(!mw(&optional, "a b c d b c d z"));
    }

    #[test]
    fn word_branch_subexpression_globs() {
        let star = cw("a $( b c $| d e $) $* z");
        assert!(mw(&star, "a z"));
        assert!(mw(&star, "a b c z"));
        assert!(mw(&star, "a b c d e b c z"));
        assert!(mw(&star, "a d e z"));
        assert!(!mw(&star, "a b e z"));
        assert!(!mw(&star, "a b c d e d e d c z"));

        let plus = cw("a $( b c $| d e $) $+ z");
        assert!(mw(&plus, "a b c z"));
        assert!(mw(&plus, "a b c d e b c z"));
        assert!(mw(&plus, "a d e z"));
        assert!(!mw(&plus, "a z"));
        assert!(!mw(&plus, "a b e z"));

        let optional = cw("a $( b c $| d e $) $? z");
        assert!(mw(&optional, "a b c z"));
        assert!(mw(&optional, "a d e z"));
        assert!(mw(&optional, "a z"));
        assert!(!mw(&optional, "a b c d e b c z"));
        assert!(!mw(&optional, "a b e z"));
    }

    #[test]
    fn word_bare_branch_globs() {
        let bare = cw("$( a $| b $| c $)");
        assert!(mw(&bare, "a"));
        assert!(mw(&bare, "b"));
        assert!(mw(&bare, "c"));
        assert!(!mw(&bare, "a b"));

        let plus = cw("$( a $| b $| c $) $+");
        assert!(mw(&plus, "a b a c b a a c"));
        assert!(!mw(&plus, ""));

        let star = cw("$( a $| b $| c $) $*");
        assert!(mw(&star, "a b a c b a a c"));
        assert!(mw(&star, ""));

        let optional = cw("$( a $| b $| c $) $?");
        assert!(mw(&optional, "a"));
        assert!(mw(&optional, ""));
        assert!(!mw(&optional, "a b"));
    }

    #[test]
    fn word_escape_makes_control_tokens_literal() {
        let p = cw("a $\\ $* b");
        assert!(mw(&p, "a $* b"));
        assert!(!mw(&p, "a b"));
    }
}
