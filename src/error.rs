//! Error taxonomies for the codec.
//!
//! Three independent failure families, all terminal for the stream:
//! structural [`GrammarError`]s from the shared validator, lexical
//! [`DecodeError`]s from the reader, and usage errors for caller
//! preconditions (wrong-event accessors, use after close). I/O faults from
//! the underlying source/sink pass through transparently so callers can tell
//! transport failures from content failures.

use std::io;

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Any failure raised by [`crate::JsonReader`] or [`crate::JsonWriter`].
#[derive(Debug, Error)]
pub enum Error {
    /// The raw characters could not be decoded as valid JSON text.
    #[error("syntax error: {source} at {line}:{column}")]
    Syntax {
        /// What exactly failed to decode.
        source: DecodeError,
        /// 1-based line of the offending character.
        line: usize,
        /// 1-based column of the offending character.
        column: usize,
    },

    /// A token was structurally illegal at the current cursor position.
    #[error("grammar error: {0}")]
    Grammar(#[from] GrammarError),

    /// A method was called in a state its contract forbids. This indicates
    /// caller misuse, not malformed data.
    #[error("invalid state: {0}")]
    Usage(&'static str),

    /// An on-demand numeric conversion of a captured lexeme failed.
    #[error("cannot convert number '{lexeme}': {reason}")]
    NumberConvert {
        /// The exact captured number text.
        lexeme: String,
        /// The parse failure reported by the target type.
        reason: String,
    },

    /// A caller-supplied number lexeme did not match the JSON number
    /// grammar.
    #[error("invalid number literal '{0}'")]
    InvalidNumberLiteral(String),

    /// A fault from the underlying source or sink, propagated unchanged.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// Returns `true` for structural grammar violations, including
    /// duplicate keys.
    #[must_use]
    pub fn is_grammar(&self) -> bool {
        matches!(self, Error::Grammar(_))
    }

    /// Returns `true` for lexical decode failures.
    #[must_use]
    pub fn is_syntax(&self) -> bool {
        matches!(self, Error::Syntax { .. })
    }
}

/// A token was rejected by the grammar analyzer. Terminal: the analyzer
/// stays finished and every further push fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// The pushed token is not in the legal-next set for the current stack
    /// top and separator flags.
    #[error("expected {expected}, found {found}")]
    UnexpectedToken {
        /// Human-readable rendering of the legal-next token set.
        expected: &'static str,
        /// Name of the rejected token category.
        found: &'static str,
    },

    /// An object key repeated within the same object.
    #[error("duplicate key '{0}'")]
    DuplicateKey(String),
}

/// Raw input could not be decoded as a JSON token.
///
/// Distinguishes malformed-but-present data from truncated streams: every
/// variant other than [`DecodeError::UnexpectedEof`] names the offending
/// bytes or characters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A character that cannot start or continue any token. Non-printable
    /// characters are rendered as `\uXXXX`.
    #[error("unexpected character '{0}'")]
    UnexpectedCharacter(String),

    /// The source ended where a token or the rest of one was expected.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// The character after an unescaped backslash is not a legal escape.
    #[error("invalid escape character '{0}'")]
    InvalidEscape(String),

    /// A `\uXXXX` sequence contained a non-hex digit.
    #[error("invalid unicode escape character '{0}'")]
    InvalidUnicodeEscape(String),

    /// A surrogate `\uXXXX` code unit without its required partner.
    #[error("unpaired surrogate \\u{0:04X}")]
    UnpairedSurrogate(u16),

    /// A raw (unescaped) control character inside a string literal.
    #[error("raw control character '{0}' in string literal")]
    ControlCharacter(String),

    /// A number lexeme used only legal characters but violated the JSON
    /// number grammar. Raised at token-boundary time.
    #[error("malformed number literal '{0}'")]
    MalformedNumber(String),

    /// The byte stream is not valid in the stream's character encoding.
    #[error("malformed {0} byte sequence")]
    MalformedEncoding(&'static str),
}

/// Renders a character for an error message, escaping non-printables as
/// `\uXXXX` so truncated terminals and logs stay readable.
pub(crate) fn format_char(c: char) -> String {
    match c {
        '\\' => "\\\\".into(),
        '"' => "\\\"".into(),
        c if c.is_control() || (c.is_whitespace() && !c.is_ascii_whitespace()) => {
            format!("\\u{:04X}", c as u32)
        }
        c => c.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn printable_chars_render_verbatim() {
        assert_eq!(format_char('a'), "a");
        assert_eq!(format_char('ß'), "ß");
    }

    #[test]
    fn control_chars_render_as_unicode_escapes() {
        assert_eq!(format_char('\u{0}'), "\\u0000");
        assert_eq!(format_char('\u{9F}'), "\\u009F");
        assert_eq!(format_char('\u{2028}'), "\\u2028");
    }

    #[test]
    fn decode_errors_name_the_offender() {
        let err = DecodeError::UnexpectedCharacter(format_char('\u{7}'));
        assert_eq!(err.to_string(), "unexpected character '\\u0007'");
        assert_eq!(
            DecodeError::UnexpectedEof.to_string(),
            "unexpected end of input"
        );
    }
}
