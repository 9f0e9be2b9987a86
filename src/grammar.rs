//! The shared grammar analyzer.
//!
//! A finite-state validator over a push-down stack of structural entries.
//! The reader feeds it one [`GrammarToken`] per lexed token; the writer
//! feeds it one per write call (separators included). The stack top plus a
//! single comma flag fully determine which tokens are legal next, so every
//! transition is O(1) apart from duplicate-key bookkeeping.
//!
//! Value tokens accepted directly under an array or a colon do not grow the
//! stack: they are absorbed, flipping the comma flag on the layer beneath. A
//! string accepted directly under an object is the one exception: it stays
//! on the stack as the pending-key marker until its colon and value arrive.
//!
//! Any rejected token moves the analyzer to the terminal finished state;
//! a fresh reader/writer (and with it a fresh analyzer) is the only way to
//! recover.

use std::collections::HashSet;

use crate::{error::GrammarError, event::Event};

/// Abstract category of a JSON syntax unit, internal to the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GrammarToken {
    ObjectStart,
    ObjectEnd,
    ArrayStart,
    ArrayEnd,
    String,
    Number,
    Boolean,
    Null,
    Colon,
    Comma,
}

impl GrammarToken {
    pub(crate) fn name(self) -> &'static str {
        match self {
            GrammarToken::ObjectStart => "'{'",
            GrammarToken::ObjectEnd => "'}'",
            GrammarToken::ArrayStart => "'['",
            GrammarToken::ArrayEnd => "']'",
            GrammarToken::String => "a string",
            GrammarToken::Number => "a number",
            GrammarToken::Boolean => "a boolean",
            GrammarToken::Null => "'null'",
            GrammarToken::Colon => "':'",
            GrammarToken::Comma => "','",
        }
    }

    /// Tokens that may begin a JSON value.
    fn starts_value(self) -> bool {
        matches!(
            self,
            GrammarToken::ObjectStart
                | GrammarToken::ArrayStart
                | GrammarToken::String
                | GrammarToken::Number
                | GrammarToken::Boolean
                | GrammarToken::Null
        )
    }

    /// The event surfaced to callers when this token is accepted, if any.
    fn event(self) -> Option<Event> {
        match self {
            GrammarToken::ObjectStart => Some(Event::ObjectStart),
            GrammarToken::ObjectEnd => Some(Event::ObjectEnd),
            GrammarToken::ArrayStart => Some(Event::ArrayStart),
            GrammarToken::ArrayEnd => Some(Event::ArrayEnd),
            GrammarToken::String => Some(Event::String),
            GrammarToken::Number => Some(Event::Number),
            GrammarToken::Boolean => Some(Event::Boolean),
            GrammarToken::Null => Some(Event::Null),
            GrammarToken::Colon | GrammarToken::Comma => None,
        }
    }
}

/// One structural stack entry. `Key` and `Colon` together hold the place of
/// an object member until its value completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StackEntry {
    Object,
    Array,
    Key,
    Colon,
}

/// Incremental well-formedness validator for one JSON stream.
///
/// Owned 1:1 by a reader or writer instance; never shared.
#[derive(Debug, Default)]
pub(crate) struct GrammarAnalyzer {
    stack: Vec<StackEntry>,
    /// One set of seen keys per open object; lifecycle mirrors object
    /// nesting depth exactly.
    seen_keys: Vec<HashSet<String>>,
    comma_expected: bool,
    current_event: Option<Event>,
    started: bool,
    finished: bool,
}

impl GrammarAnalyzer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Last accepted caller-visible event. `None` before the first token
    /// and immediately after a colon or comma.
    pub(crate) fn current_event(&self) -> Option<Event> {
        self.current_event
    }

    /// True once the single top-level value has closed or a violation was
    /// detected. Terminal.
    pub(crate) fn is_finished(&self) -> bool {
        self.finished
    }

    /// True once any token has been accepted.
    pub(crate) fn has_started(&self) -> bool {
        self.started
    }

    /// True when the only legal next token is a colon (a key string was
    /// just accepted).
    pub(crate) fn colon_expected(&self) -> bool {
        matches!(self.stack.last(), Some(StackEntry::Key))
    }

    /// True when a comma must precede the next sibling key or value.
    pub(crate) fn comma_expected(&self) -> bool {
        self.comma_expected
    }

    /// Feeds a non-string token.
    pub(crate) fn push(&mut self, token: GrammarToken) -> Result<(), GrammarError> {
        debug_assert_ne!(token, GrammarToken::String, "strings go through push_string");
        self.push_inner(token, "")
    }

    /// Feeds a string token, carrying the decoded text for duplicate-key
    /// detection when the string lands in key position.
    pub(crate) fn push_string(&mut self, value: &str) -> Result<(), GrammarError> {
        self.push_inner(GrammarToken::String, value)
    }

    fn push_inner(&mut self, token: GrammarToken, string: &str) -> Result<(), GrammarError> {
        if self.finished || !self.is_legal(token) {
            return Err(self.reject(token));
        }
        self.started = true;
        self.current_event = token.event();

        match token {
            GrammarToken::ObjectStart => {
                self.stack.push(StackEntry::Object);
                self.seen_keys.push(HashSet::new());
                self.comma_expected = false;
            }
            GrammarToken::ArrayStart => {
                self.stack.push(StackEntry::Array);
                self.comma_expected = false;
            }
            GrammarToken::String if self.stack.last() == Some(&StackEntry::Object) => {
                // Key position: retained on the stack until the member's
                // value completes.
                let keys = self.seen_keys.last_mut().unwrap();
                if !keys.insert(string.to_owned()) {
                    self.finished = true;
                    return Err(GrammarError::DuplicateKey(string.to_owned()));
                }
                self.stack.push(StackEntry::Key);
            }
            GrammarToken::String
            | GrammarToken::Number
            | GrammarToken::Boolean
            | GrammarToken::Null => self.absorb_value(),
            GrammarToken::Colon => {
                self.stack.push(StackEntry::Colon);
            }
            GrammarToken::Comma => {
                self.comma_expected = false;
            }
            GrammarToken::ObjectEnd => {
                self.stack.pop();
                self.seen_keys.pop();
                self.unwind();
            }
            GrammarToken::ArrayEnd => {
                self.stack.pop();
                self.unwind();
            }
        }
        Ok(())
    }

    fn is_legal(&self, token: GrammarToken) -> bool {
        match self.stack.last() {
            None => matches!(
                token,
                GrammarToken::ObjectStart | GrammarToken::ArrayStart
            ),
            Some(StackEntry::Object) if !self.comma_expected => {
                matches!(token, GrammarToken::String | GrammarToken::ObjectEnd)
            }
            Some(StackEntry::Object) => {
                matches!(token, GrammarToken::Comma | GrammarToken::ObjectEnd)
            }
            Some(StackEntry::Array) if !self.comma_expected => {
                token.starts_value() || token == GrammarToken::ArrayEnd
            }
            Some(StackEntry::Array) => {
                matches!(token, GrammarToken::Comma | GrammarToken::ArrayEnd)
            }
            Some(StackEntry::Key) => token == GrammarToken::Colon,
            Some(StackEntry::Colon) => token.starts_value(),
        }
    }

    /// A scalar value (or a container, on open) completed directly under an
    /// array or colon: collapse the pending key/colon pair if present and
    /// require a comma before the next sibling.
    fn absorb_value(&mut self) {
        if self.stack.last() == Some(&StackEntry::Colon) {
            self.stack.pop();
            let key = self.stack.pop();
            debug_assert_eq!(key, Some(StackEntry::Key));
        }
        self.comma_expected = true;
    }

    /// After popping a closed container, restore the enclosing layer's
    /// expectations; an empty stack finishes the stream.
    fn unwind(&mut self) {
        match self.stack.last() {
            None => self.finished = true,
            Some(StackEntry::Colon) => {
                self.stack.pop();
                let key = self.stack.pop();
                debug_assert_eq!(key, Some(StackEntry::Key));
                self.comma_expected = true;
            }
            Some(StackEntry::Array | StackEntry::Object) => self.comma_expected = true,
            Some(StackEntry::Key) => unreachable!("container cannot sit on a bare key"),
        }
    }

    fn reject(&mut self, token: GrammarToken) -> GrammarError {
        let expected = self.expected_tokens();
        self.finished = true;
        GrammarError::UnexpectedToken {
            expected,
            found: token.name(),
        }
    }

    /// Renders the legal-next token set for diagnostics. Reconstructed from
    /// the stack top and comma flag; never used for control flow.
    pub(crate) fn expected_tokens(&self) -> &'static str {
        if self.finished {
            return "no further tokens (value complete)";
        }
        match (self.stack.last(), self.comma_expected) {
            (None, _) => "'{' or '['",
            (Some(StackEntry::Object), false) => "a key string or '}'",
            (Some(StackEntry::Object), true) => "',' or '}'",
            (Some(StackEntry::Array), false) => "a value or ']'",
            (Some(StackEntry::Array), true) => "',' or ']'",
            (Some(StackEntry::Key), _) => "':'",
            (Some(StackEntry::Colon), _) => "a value",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALUES: [GrammarToken; 4] = [
        GrammarToken::String,
        GrammarToken::Number,
        GrammarToken::Boolean,
        GrammarToken::Null,
    ];

    const ALL: [GrammarToken; 10] = [
        GrammarToken::ObjectStart,
        GrammarToken::ObjectEnd,
        GrammarToken::ArrayStart,
        GrammarToken::ArrayEnd,
        GrammarToken::String,
        GrammarToken::Number,
        GrammarToken::Boolean,
        GrammarToken::Null,
        GrammarToken::Colon,
        GrammarToken::Comma,
    ];

    fn feed(analyzer: &mut GrammarAnalyzer, token: GrammarToken) -> Result<(), GrammarError> {
        match token {
            GrammarToken::String => analyzer.push_string("k"),
            other => analyzer.push(other),
        }
    }

    /// Builds an analyzer by replaying a token sequence that must be legal.
    fn analyzer_after(tokens: &[GrammarToken]) -> GrammarAnalyzer {
        let mut a = GrammarAnalyzer::new();
        for (i, &t) in tokens.iter().enumerate() {
            // Use distinct keys so setup never trips duplicate detection.
            let r = if t == GrammarToken::String {
                a.push_string(&format!("k{i}"))
            } else {
                a.push(t)
            };
            r.expect("setup sequence must be legal");
        }
        a
    }

    /// For every reachable stack-top/flag combination, exactly the
    /// documented token subset is accepted.
    #[test]
    fn legal_continuations_are_exact() {
        use GrammarToken::*;

        // (setup prefix, the exact set of legal next tokens)
        let cases: Vec<(Vec<GrammarToken>, Vec<GrammarToken>)> = vec![
            // Stack empty, not started.
            (vec![], vec![ObjectStart, ArrayStart]),
            // Top = object, no comma pending.
            (vec![ObjectStart], vec![String, ObjectEnd]),
            // Top = object, comma pending.
            (
                vec![ObjectStart, String, Colon, Null],
                vec![Comma, ObjectEnd],
            ),
            // Top = key string.
            (vec![ObjectStart, String], vec![Colon]),
            // Top = colon.
            (
                vec![ObjectStart, String, Colon],
                vec![ObjectStart, ArrayStart, String, Number, Boolean, Null],
            ),
            // Top = array, no comma pending.
            (
                vec![ArrayStart],
                vec![ObjectStart, ArrayStart, ArrayEnd, String, Number, Boolean, Null],
            ),
            // Top = array, comma pending.
            (vec![ArrayStart, Number], vec![Comma, ArrayEnd]),
            // Stack empty, finished.
            (vec![ArrayStart, ArrayEnd], vec![]),
        ];

        for (prefix, legal) in cases {
            for token in ALL {
                let mut a = analyzer_after(&prefix);
                let result = feed(&mut a, token);
                assert_eq!(
                    result.is_ok(),
                    legal.contains(&token),
                    "after {prefix:?}, token {token:?}"
                );
                if result.is_err() {
                    assert!(a.is_finished(), "rejection must be terminal");
                }
            }
        }
    }

    #[test]
    fn scalar_values_do_not_grow_the_stack() {
        let mut a = GrammarAnalyzer::new();
        a.push(GrammarToken::ArrayStart).unwrap();
        for v in VALUES {
            feed(&mut a, v).unwrap();
            assert_eq!(a.stack.len(), 1);
            assert!(a.comma_expected());
            a.push(GrammarToken::Comma).unwrap();
        }
    }

    #[test]
    fn key_string_is_retained_until_value_completes() {
        let mut a = GrammarAnalyzer::new();
        a.push(GrammarToken::ObjectStart).unwrap();
        a.push_string("a").unwrap();
        assert!(a.colon_expected());
        assert_eq!(a.stack.len(), 2);
        a.push(GrammarToken::Colon).unwrap();
        a.push(GrammarToken::Number).unwrap();
        assert_eq!(a.stack.len(), 1);
        assert!(a.comma_expected());
    }

    #[test]
    fn closing_nested_containers_unwinds_pending_keys() {
        // {"a": [{}]}: every end must collapse back to the right layer.
        let mut a = GrammarAnalyzer::new();
        a.push(GrammarToken::ObjectStart).unwrap();
        a.push_string("a").unwrap();
        a.push(GrammarToken::Colon).unwrap();
        a.push(GrammarToken::ArrayStart).unwrap();
        a.push(GrammarToken::ObjectStart).unwrap();
        a.push(GrammarToken::ObjectEnd).unwrap();
        a.push(GrammarToken::ArrayEnd).unwrap();
        assert!(a.comma_expected());
        assert!(!a.is_finished());
        a.push(GrammarToken::ObjectEnd).unwrap();
        assert!(a.is_finished());
    }

    #[test]
    fn duplicate_key_fails_at_second_occurrence() {
        let mut a = GrammarAnalyzer::new();
        a.push(GrammarToken::ObjectStart).unwrap();
        a.push_string("a").unwrap();
        a.push(GrammarToken::Colon).unwrap();
        a.push(GrammarToken::Number).unwrap();
        a.push(GrammarToken::Comma).unwrap();
        let err = a.push_string("a").unwrap_err();
        assert_eq!(err, GrammarError::DuplicateKey("a".into()));
        assert!(a.is_finished());
    }

    #[test]
    fn same_key_in_sibling_objects_is_allowed() {
        // [{"a":1},{"a":2}]: key sets are per object.
        let mut a = GrammarAnalyzer::new();
        a.push(GrammarToken::ArrayStart).unwrap();
        for i in 0..2 {
            if i > 0 {
                a.push(GrammarToken::Comma).unwrap();
            }
            a.push(GrammarToken::ObjectStart).unwrap();
            a.push_string("a").unwrap();
            a.push(GrammarToken::Colon).unwrap();
            a.push(GrammarToken::Number).unwrap();
            a.push(GrammarToken::ObjectEnd).unwrap();
        }
        a.push(GrammarToken::ArrayEnd).unwrap();
        assert!(a.is_finished());
    }

    #[test]
    fn reuse_of_key_after_closing_inner_object_is_allowed() {
        // {"a":{"a":1}}: inner and outer sets are independent.
        let mut a = GrammarAnalyzer::new();
        a.push(GrammarToken::ObjectStart).unwrap();
        a.push_string("a").unwrap();
        a.push(GrammarToken::Colon).unwrap();
        a.push(GrammarToken::ObjectStart).unwrap();
        a.push_string("a").unwrap();
        a.push(GrammarToken::Colon).unwrap();
        a.push(GrammarToken::Number).unwrap();
        a.push(GrammarToken::ObjectEnd).unwrap();
        a.push(GrammarToken::ObjectEnd).unwrap();
        assert!(a.is_finished());
    }

    #[test]
    fn colon_and_comma_clear_the_current_event() {
        let mut a = GrammarAnalyzer::new();
        a.push(GrammarToken::ObjectStart).unwrap();
        assert_eq!(a.current_event(), Some(Event::ObjectStart));
        a.push_string("a").unwrap();
        assert_eq!(a.current_event(), Some(Event::String));
        a.push(GrammarToken::Colon).unwrap();
        assert_eq!(a.current_event(), None);
        a.push(GrammarToken::Number).unwrap();
        assert_eq!(a.current_event(), Some(Event::Number));
    }

    #[test]
    fn nothing_is_legal_after_finish() {
        let mut a = analyzer_after(&[GrammarToken::ObjectStart, GrammarToken::ObjectEnd]);
        assert!(a.is_finished());
        let err = a.push(GrammarToken::ObjectStart).unwrap_err();
        assert!(matches!(err, GrammarError::UnexpectedToken { .. }));
    }

    #[test]
    fn rejection_messages_name_the_expected_set() {
        let mut a = GrammarAnalyzer::new();
        a.push(GrammarToken::ObjectStart).unwrap();
        let err = a.push(GrammarToken::Number).unwrap_err();
        assert_eq!(
            err.to_string(),
            "expected a key string or '}', found a number"
        );
    }
}
