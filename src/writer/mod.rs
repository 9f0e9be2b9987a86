//! The token-ordered writer.
//!
//! [`JsonWriter`] is the emission mirror of the reader: every typed write
//! call asks the shared grammar analyzer whether a colon or comma must be
//! auto-emitted first, registers the separator, feeds the new token for
//! validation, and only then encodes it into an internal buffer that drains
//! to the sink in blocks. A rejected token poisons the writer with the same
//! grammar-error taxonomy the reader uses.

#[cfg(test)]
mod tests;

use std::io::Write;

use crate::{
    error::{Error, Result},
    grammar::{GrammarAnalyzer, GrammarToken},
    number,
};

/// Buffered output past this size drains to the sink.
const FLUSH_THRESHOLD: usize = 4096;

/// A streaming JSON writer over an [`io::Write`](std::io::Write) sink.
///
/// Output is UTF-8. The sink is never closed; [`JsonWriter::into_inner`]
/// hands it back. Callers must [`flush`](JsonWriter::flush) before
/// [`close`](JsonWriter::close).
///
/// # Examples
///
/// ```rust
/// use jsonpull::JsonWriter;
///
/// let mut out = Vec::new();
/// let mut w = JsonWriter::new(&mut out);
/// w.write_array_start().unwrap();
/// w.write_string("a").unwrap();
/// w.write_f64(1.5).unwrap();
/// w.write_null().unwrap();
/// w.write_array_end().unwrap();
/// w.flush().unwrap();
/// w.close().unwrap();
/// assert_eq!(out, br#"["a",1.5,null]"#);
/// ```
#[derive(Debug)]
pub struct JsonWriter<W: Write> {
    sink: W,
    buf: Vec<u8>,
    grammar: GrammarAnalyzer,
    closed: bool,
}

impl<W: Write> JsonWriter<W> {
    /// Creates a writer emitting UTF-8 JSON text to `sink`.
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            buf: Vec::with_capacity(FLUSH_THRESHOLD),
            grammar: GrammarAnalyzer::new(),
            closed: false,
        }
    }

    /// Emits `{`, auto-inserting any pending separator.
    ///
    /// # Errors
    ///
    /// A grammar error when an object cannot start here, a usage error
    /// after `close`, or an I/O fault from draining the buffer.
    pub fn write_object_start(&mut self) -> Result<()> {
        self.write_token(GrammarToken::ObjectStart)?;
        self.push_and_drain(b"{")
    }

    /// Emits `}`.
    ///
    /// # Errors
    ///
    /// See [`JsonWriter::write_object_start`].
    pub fn write_object_end(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.grammar.push(GrammarToken::ObjectEnd)?;
        self.push_and_drain(b"}")
    }

    /// Emits `[`, auto-inserting any pending separator.
    ///
    /// # Errors
    ///
    /// See [`JsonWriter::write_object_start`].
    pub fn write_array_start(&mut self) -> Result<()> {
        self.write_token(GrammarToken::ArrayStart)?;
        self.push_and_drain(b"[")
    }

    /// Emits `]`.
    ///
    /// # Errors
    ///
    /// See [`JsonWriter::write_object_start`].
    pub fn write_array_end(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.grammar.push(GrammarToken::ArrayEnd)?;
        self.push_and_drain(b"]")
    }

    /// Emits the `null` literal.
    ///
    /// # Errors
    ///
    /// See [`JsonWriter::write_object_start`].
    pub fn write_null(&mut self) -> Result<()> {
        self.write_token(GrammarToken::Null)?;
        self.push_and_drain(b"null")
    }

    /// Emits `true` or `false`.
    ///
    /// # Errors
    ///
    /// See [`JsonWriter::write_object_start`].
    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.write_token(GrammarToken::Boolean)?;
        self.push_and_drain(if value { b"true" as &[u8] } else { b"false" })
    }

    /// Emits a string literal, quoted and escaped. Inside an object this
    /// writes either a key or a value depending on position; duplicate keys
    /// are rejected.
    ///
    /// # Errors
    ///
    /// See [`JsonWriter::write_object_start`]; additionally a duplicate-key
    /// grammar error.
    pub fn write_string(&mut self, value: &str) -> Result<()> {
        self.ensure_open()?;
        self.write_separator()?;
        self.grammar.push_string(value)?;
        self.encode_string(value);
        self.drain_if_full()
    }

    /// Emits a caller-supplied number lexeme verbatim after validating it
    /// against the JSON number grammar. This is the arbitrary-precision
    /// path: any exact decimal text, however long, passes through
    /// unchanged.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidNumberLiteral`] for a non-conformant lexeme, plus
    /// the failures of [`JsonWriter::write_object_start`].
    pub fn write_number_str(&mut self, lexeme: &str) -> Result<()> {
        self.ensure_open()?;
        if !number::validate_lexeme(lexeme) {
            return Err(Error::InvalidNumberLiteral(lexeme.to_owned()));
        }
        self.write_token(GrammarToken::Number)?;
        self.buf.extend_from_slice(lexeme.as_bytes());
        self.drain_if_full()
    }

    /// Emits a finite `f64` as its shortest round-trippable decimal text.
    ///
    /// # Errors
    ///
    /// A usage error for NaN or infinity (JSON cannot represent them),
    /// plus the failures of [`JsonWriter::write_object_start`].
    pub fn write_f64(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(Error::Usage("JSON cannot represent a non-finite number"));
        }
        self.write_token(GrammarToken::Number)?;
        // Rust's float Display is the shortest text that parses back to
        // the same value; integral floats render without a fraction, so a
        // `.0` is appended to keep the lexeme visibly floating-point.
        let mut text = value.to_string();
        if !text.contains('.') && !text.contains('e') && !text.contains('E') {
            text.push_str(".0");
        }
        self.buf.extend_from_slice(text.as_bytes());
        self.drain_if_full()
    }

    /// Emits a finite `f32`; see [`JsonWriter::write_f64`].
    ///
    /// # Errors
    ///
    /// See [`JsonWriter::write_f64`].
    pub fn write_f32(&mut self, value: f32) -> Result<()> {
        if !value.is_finite() {
            return Err(Error::Usage("JSON cannot represent a non-finite number"));
        }
        self.write_token(GrammarToken::Number)?;
        let mut text = value.to_string();
        if !text.contains('.') && !text.contains('e') && !text.contains('E') {
            text.push_str(".0");
        }
        self.buf.extend_from_slice(text.as_bytes());
        self.drain_if_full()
    }

    /// Drains the internal buffer to the sink and flushes the sink. Never
    /// closes it.
    ///
    /// # Errors
    ///
    /// I/O faults from the sink, or a usage error after `close`.
    pub fn flush(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.drain()?;
        self.sink.flush()?;
        Ok(())
    }

    /// Releases internal state. Fails if buffered output has not been
    /// flushed or if a started document is structurally incomplete; the
    /// sink itself is never closed.
    ///
    /// # Errors
    ///
    /// A usage error for unflushed data or an unclosed document.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        if !self.buf.is_empty() {
            return Err(Error::Usage("unflushed data; call flush() before close()"));
        }
        if self.grammar.has_started() && !self.grammar.is_finished() {
            return Err(Error::Usage("incomplete JSON document"));
        }
        self.buf = Vec::new();
        self.closed = true;
        Ok(())
    }

    /// Consumes the writer and returns the underlying sink.
    pub fn into_inner(self) -> W {
        self.sink
    }

    // --- internals --------------------------------------------------------

    /// Separator check + structural validation shared by all non-string
    /// token writes.
    fn write_token(&mut self, token: GrammarToken) -> Result<()> {
        self.ensure_open()?;
        self.write_separator()?;
        self.grammar.push(token)?;
        Ok(())
    }

    /// Auto-emits the colon or comma the analyzer expects before a key or
    /// value token, registering it first. The two are mutually exclusive:
    /// a colon only ever follows a just-written key, a comma a completed
    /// sibling value.
    fn write_separator(&mut self) -> Result<()> {
        // Once the document has closed, go straight to the token push so
        // the rejection names what the caller wrote, not an auto-comma.
        if self.grammar.is_finished() {
            return Ok(());
        }
        if self.grammar.colon_expected() {
            self.grammar.push(GrammarToken::Colon)?;
            self.buf.push(b':');
        } else if self.grammar.comma_expected() {
            self.grammar.push(GrammarToken::Comma)?;
            self.buf.push(b',');
        }
        Ok(())
    }

    fn encode_string(&mut self, value: &str) {
        self.buf.push(b'"');
        for c in value.chars() {
            match c {
                '"' => self.buf.extend_from_slice(b"\\\""),
                '\\' => self.buf.extend_from_slice(b"\\\\"),
                '\u{0008}' => self.buf.extend_from_slice(b"\\b"),
                '\u{000C}' => self.buf.extend_from_slice(b"\\f"),
                '\n' => self.buf.extend_from_slice(b"\\n"),
                '\r' => self.buf.extend_from_slice(b"\\r"),
                '\t' => self.buf.extend_from_slice(b"\\t"),
                // The reader rejects raw C0, DEL, and C1 characters, so
                // they must leave here escaped. Solidus is never escaped.
                c if matches!(c, '\u{0000}'..='\u{001F}' | '\u{007F}'..='\u{009F}') => {
                    let mut quad = [0u8; 4];
                    let code = c as u32;
                    for (i, slot) in quad.iter_mut().enumerate() {
                        let nibble = (code >> (12 - 4 * i)) & 0xF;
                        *slot = char::from_digit(nibble, 16)
                            .expect("nibble is a hex digit")
                            .to_ascii_uppercase() as u8;
                    }
                    self.buf.extend_from_slice(b"\\u");
                    self.buf.extend_from_slice(&quad);
                }
                c => {
                    let mut utf8 = [0u8; 4];
                    self.buf
                        .extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
                }
            }
        }
        self.buf.push(b'"');
    }

    fn push_and_drain(&mut self, bytes: &[u8]) -> Result<()> {
        self.buf.extend_from_slice(bytes);
        self.drain_if_full()
    }

    fn drain_if_full(&mut self) -> Result<()> {
        if self.buf.len() >= FLUSH_THRESHOLD {
            self.drain()?;
        }
        Ok(())
    }

    fn drain(&mut self) -> Result<()> {
        if !self.buf.is_empty() {
            self.sink.write_all(&self.buf)?;
            self.buf.clear();
        }
        Ok(())
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(Error::Usage("writer is closed"));
        }
        Ok(())
    }
}

/// Generates the fixed-width integer writers over the shared digit-pair
/// encoder.
macro_rules! integer_writers {
    ($( $(#[$doc:meta])* $name:ident($ty:ty) via $core:ident; )*) => {
        impl<W: Write> JsonWriter<W> {
            $(
                $(#[$doc])*
                /// # Errors
                ///
                /// See [`JsonWriter::write_object_start`].
                pub fn $name(&mut self, value: $ty) -> Result<()> {
                    self.write_token(GrammarToken::Number)?;
                    number::$core(value.into(), &mut self.buf);
                    self.drain_if_full()
                }
            )*
        }
    };
}

integer_writers! {
    /// Emits a signed integer in canonical decimal text.
    write_i8(i8) via encode_i128;
    /// Emits a signed integer in canonical decimal text.
    write_i16(i16) via encode_i128;
    /// Emits a signed integer in canonical decimal text.
    write_i32(i32) via encode_i128;
    /// Emits a signed integer in canonical decimal text.
    write_i64(i64) via encode_i128;
    /// Emits a signed integer in canonical decimal text.
    write_i128(i128) via encode_i128;
    /// Emits an unsigned integer in canonical decimal text.
    write_u8(u8) via encode_u128;
    /// Emits an unsigned integer in canonical decimal text.
    write_u16(u16) via encode_u128;
    /// Emits an unsigned integer in canonical decimal text.
    write_u32(u32) via encode_u128;
    /// Emits an unsigned integer in canonical decimal text.
    write_u64(u64) via encode_u128;
    /// Emits an unsigned integer in canonical decimal text.
    write_u128(u128) via encode_u128;
}
