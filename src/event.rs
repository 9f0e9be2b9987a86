//! The caller-visible classification of the reader cursor.

use core::fmt;

/// A validated JSON event reported by [`crate::JsonReader::next_event`].
///
/// Colons and commas are consumed internally and never appear here; object
/// keys are reported as [`Event::String`] like any other string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A `{` opened an object.
    ObjectStart,
    /// A `}` closed the innermost object.
    ObjectEnd,
    /// A `[` opened an array.
    ArrayStart,
    /// A `]` closed the innermost array.
    ArrayEnd,
    /// A string literal (key or value); read it with
    /// [`crate::JsonReader::string_value`].
    String,
    /// A number literal; read it with [`crate::JsonReader::number_lexeme`]
    /// or one of the typed accessors.
    Number,
    /// A `true` or `false` literal.
    Boolean,
    /// A `null` literal.
    Null,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Event::ObjectStart => "object start",
            Event::ObjectEnd => "object end",
            Event::ArrayStart => "array start",
            Event::ArrayEnd => "array end",
            Event::String => "string",
            Event::Number => "number",
            Event::Boolean => "boolean",
            Event::Null => "null",
        };
        f.write_str(name)
    }
}
