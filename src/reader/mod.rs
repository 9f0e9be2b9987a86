//! The pull-based event reader.
//!
//! [`JsonReader`] pulls bytes from an [`io::Read`] source, decodes them to
//! characters (auto-detecting the encoding per RFC 4627 unless one was
//! pinned), lexes one JSON token at a time, and validates every token
//! against its own grammar analyzer before surfacing it as an [`Event`].
//! Colons and commas are validated and swallowed; callers only ever see
//! value and container events.

mod byte_buffer;
mod decoder;


use std::io::Read;
use std::str::FromStr;

use byte_buffer::ByteBuffer;
pub use decoder::Encoding;
use decoder::DecodeStep;

use crate::{
    error::{format_char, DecodeError, Error, Result},
    event::Event,
    grammar::{GrammarAnalyzer, GrammarToken},
    number::{self, Number},
};

/// A streaming JSON event reader over an [`io::Read`] source.
///
/// Single-threaded and synchronous: every call either completes or fails,
/// and any failure other than more-input-needed is terminal for the stream.
/// The underlying source is never closed; [`JsonReader::into_inner`] hands
/// it back.
///
/// One input leniency: a trailing comma before a closing bracket (`[1,]`,
/// `{"a":1,}`) is tolerated. [`JsonWriter`](crate::JsonWriter) never emits
/// one, so accepted documents still round-trip.
///
/// # Examples
///
/// ```rust
/// use jsonpull::{Event, JsonReader};
///
/// let mut reader = JsonReader::new(&br#"["a", 1]"#[..]);
/// assert_eq!(reader.next_event().unwrap(), Event::ArrayStart);
/// assert_eq!(reader.next_event().unwrap(), Event::String);
/// assert_eq!(reader.string_value().unwrap(), "a");
/// assert_eq!(reader.next_event().unwrap(), Event::Number);
/// assert_eq!(reader.number_lexeme().unwrap(), "1");
/// assert_eq!(reader.next_event().unwrap(), Event::ArrayEnd);
/// assert!(!reader.has_next().unwrap());
/// ```
#[derive(Debug)]
pub struct JsonReader<R: Read> {
    source: R,
    buf: ByteBuffer,
    /// `None` until detection has seen the first bytes.
    encoding: Option<Encoding>,
    grammar: GrammarAnalyzer,
    /// Decoded string content or raw number lexeme of the current event.
    scratch: String,
    bool_value: bool,
    line: usize,
    column: usize,
    eof: bool,
    closed: bool,
}

impl<R: Read> JsonReader<R> {
    /// Creates a reader that detects the stream encoding from its first
    /// four bytes, defaulting to UTF-8.
    pub fn new(source: R) -> Self {
        Self::build(source, None)
    }

    /// Creates a reader with a pinned encoding; no detection is performed
    /// and no byte-order mark is expected.
    pub fn with_encoding(source: R, encoding: Encoding) -> Self {
        Self::build(source, Some(encoding))
    }

    fn build(source: R, encoding: Option<Encoding>) -> Self {
        Self {
            source,
            buf: ByteBuffer::new(),
            encoding,
            grammar: GrammarAnalyzer::new(),
            scratch: String::new(),
            bool_value: false,
            line: 1,
            column: 1,
            eof: false,
            closed: false,
        }
    }

    /// Returns `true` when another token can be pulled.
    ///
    /// Skips whitespace but never consumes a token. Once the top-level
    /// value has closed this reports `false` without touching trailing
    /// content.
    ///
    /// # Errors
    ///
    /// Fails with an unexpected-EOF syntax error when the source ends in
    /// the middle of a document, or with a usage error after `close`.
    pub fn has_next(&mut self) -> Result<bool> {
        self.ensure_open()?;
        if self.grammar.is_finished() {
            return Ok(false);
        }
        self.skip_whitespace()?;
        match self.peek_char()? {
            Some(_) => Ok(true),
            None if self.grammar.has_started() => Err(self.syntax(DecodeError::UnexpectedEof)),
            None => Ok(false),
        }
    }

    /// Pulls, validates, and returns the next event.
    ///
    /// # Errors
    ///
    /// Grammar violations, decode failures, I/O faults, or a usage error
    /// when the stream is exhausted or the reader closed. All failures are
    /// terminal; create a fresh reader to retry.
    pub fn next_event(&mut self) -> Result<Event> {
        self.ensure_open()?;
        if self.grammar.is_finished() {
            // Trailing content after the top-level value is never consumed.
            return Err(Error::Usage("no more tokens in the stream"));
        }
        loop {
            self.skip_whitespace()?;
            let Some(c) = self.peek_char()? else {
                return Err(self.syntax(DecodeError::UnexpectedEof));
            };
            match c {
                '{' => {
                    self.next_char()?;
                    self.grammar.push(GrammarToken::ObjectStart)?;
                    return Ok(Event::ObjectStart);
                }
                '}' => {
                    self.next_char()?;
                    self.grammar.push(GrammarToken::ObjectEnd)?;
                    return Ok(Event::ObjectEnd);
                }
                '[' => {
                    self.next_char()?;
                    self.grammar.push(GrammarToken::ArrayStart)?;
                    return Ok(Event::ArrayStart);
                }
                ']' => {
                    self.next_char()?;
                    self.grammar.push(GrammarToken::ArrayEnd)?;
                    return Ok(Event::ArrayEnd);
                }
                // Separators transition the analyzer but are never
                // surfaced as events.
                ':' => {
                    self.next_char()?;
                    self.grammar.push(GrammarToken::Colon)?;
                }
                ',' => {
                    self.next_char()?;
                    self.grammar.push(GrammarToken::Comma)?;
                }
                '"' => {
                    self.next_char()?;
                    self.lex_string()?;
                    self.grammar.push_string(&self.scratch)?;
                    return Ok(Event::String);
                }
                '-' | '0'..='9' => {
                    self.lex_number()?;
                    self.grammar.push(GrammarToken::Number)?;
                    return Ok(Event::Number);
                }
                't' => {
                    self.expect_literal("true")?;
                    self.bool_value = true;
                    self.grammar.push(GrammarToken::Boolean)?;
                    return Ok(Event::Boolean);
                }
                'f' => {
                    self.expect_literal("false")?;
                    self.bool_value = false;
                    self.grammar.push(GrammarToken::Boolean)?;
                    return Ok(Event::Boolean);
                }
                'n' => {
                    self.expect_literal("null")?;
                    self.grammar.push(GrammarToken::Null)?;
                    return Ok(Event::Null);
                }
                other => {
                    return Err(self.syntax(DecodeError::UnexpectedCharacter(format_char(other))));
                }
            }
        }
    }

    /// The kind of the last event returned by [`JsonReader::next_event`],
    /// if any.
    #[must_use]
    pub fn current_event(&self) -> Option<Event> {
        self.grammar.current_event()
    }

    /// The decoded content of the current string event.
    ///
    /// # Errors
    ///
    /// A usage error when the current event is not [`Event::String`].
    pub fn string_value(&self) -> Result<&str> {
        self.expect_event(Event::String, "current event is not a string")?;
        Ok(&self.scratch)
    }

    /// The value of the current boolean event.
    ///
    /// # Errors
    ///
    /// A usage error when the current event is not [`Event::Boolean`].
    pub fn boolean_value(&self) -> Result<bool> {
        self.expect_event(Event::Boolean, "current event is not a boolean")?;
        Ok(self.bool_value)
    }

    /// The exact captured text of the current number event. This is the
    /// arbitrary-precision representation: nothing is parsed or rounded.
    ///
    /// # Errors
    ///
    /// A usage error when the current event is not [`Event::Number`].
    pub fn number_lexeme(&self) -> Result<&str> {
        self.expect_event(Event::Number, "current event is not a number")?;
        Ok(&self.scratch)
    }

    /// The current number as an owned [`Number`].
    ///
    /// # Errors
    ///
    /// A usage error when the current event is not [`Event::Number`].
    pub fn number(&self) -> Result<Number> {
        self.number_lexeme()
            .map(|lexeme| Number::from_valid(lexeme.to_owned()))
    }

    /// Parses the current number lexeme on demand with `T`'s own rules.
    /// Nothing is cached; repeated calls re-parse.
    ///
    /// # Errors
    ///
    /// A usage error when the current event is not [`Event::Number`], or
    /// [`Error::NumberConvert`] when the lexeme does not fit `T`.
    pub fn number_value<T: FromStr>(&self) -> Result<T>
    where
        T::Err: core::fmt::Display,
    {
        let lexeme = self.number_lexeme()?;
        lexeme.parse().map_err(|e: T::Err| Error::NumberConvert {
            lexeme: lexeme.to_owned(),
            reason: e.to_string(),
        })
    }

    /// Convenience for [`JsonReader::number_value::<i64>`].
    ///
    /// # Errors
    ///
    /// See [`JsonReader::number_value`].
    pub fn i64_value(&self) -> Result<i64> {
        self.number_value()
    }

    /// Convenience for [`JsonReader::number_value::<u64>`].
    ///
    /// # Errors
    ///
    /// See [`JsonReader::number_value`].
    pub fn u64_value(&self) -> Result<u64> {
        self.number_value()
    }

    /// Convenience for [`JsonReader::number_value::<f64>`].
    ///
    /// # Errors
    ///
    /// See [`JsonReader::number_value`].
    pub fn f64_value(&self) -> Result<f64> {
        self.number_value()
    }

    /// Releases the internal buffer and poisons the reader. The underlying
    /// source is not closed. Idempotent.
    pub fn close(&mut self) {
        self.buf.release();
        self.scratch = String::new();
        self.closed = true;
    }

    /// Consumes the reader and returns the underlying source.
    pub fn into_inner(self) -> R {
        self.source
    }

    // --- lexing ---------------------------------------------------------

    fn lex_string(&mut self) -> Result<()> {
        self.scratch.clear();
        loop {
            let Some(c) = self.next_char()? else {
                return Err(self.syntax(DecodeError::UnexpectedEof));
            };
            match c {
                '"' => return Ok(()),
                '\\' => {
                    let decoded = self.lex_escape()?;
                    self.scratch.push(decoded);
                }
                c if is_rejected_control(c) => {
                    return Err(self.syntax(DecodeError::ControlCharacter(format_char(c))));
                }
                c => self.scratch.push(c),
            }
        }
    }

    fn lex_escape(&mut self) -> Result<char> {
        let Some(c) = self.next_char()? else {
            return Err(self.syntax(DecodeError::UnexpectedEof));
        };
        Ok(match c {
            '"' => '"',
            '\\' => '\\',
            '/' => '/',
            'b' => '\u{0008}',
            'f' => '\u{000C}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'u' => return self.lex_unicode_escape(),
            other => return Err(self.syntax(DecodeError::InvalidEscape(format_char(other)))),
        })
    }

    /// Decodes `\uXXXX` after the `\u` prefix. A high surrogate must be
    /// followed by a second escape carrying its low half; the pair combines
    /// to one scalar.
    fn lex_unicode_escape(&mut self) -> Result<char> {
        let unit = self.read_hex4()?;
        match unit {
            0xD800..=0xDBFF => {
                if self.next_char()? != Some('\\') || self.next_char()? != Some('u') {
                    return Err(self.syntax(DecodeError::UnpairedSurrogate(unit)));
                }
                let low = self.read_hex4()?;
                if !(0xDC00..=0xDFFF).contains(&low) {
                    return Err(self.syntax(DecodeError::UnpairedSurrogate(unit)));
                }
                let scalar =
                    0x10000 + ((u32::from(unit) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
                Ok(char::from_u32(scalar).expect("surrogate pair combines to a valid scalar"))
            }
            0xDC00..=0xDFFF => Err(self.syntax(DecodeError::UnpairedSurrogate(unit))),
            _ => Ok(char::from_u32(u32::from(unit)).expect("non-surrogate BMP unit")),
        }
    }

    /// Exactly four hex digits, case-insensitive.
    fn read_hex4(&mut self) -> Result<u16> {
        let mut value = 0u16;
        for _ in 0..4 {
            let Some(c) = self.next_char()? else {
                return Err(self.syntax(DecodeError::UnexpectedEof));
            };
            let Some(digit) = c.to_digit(16) else {
                return Err(self.syntax(DecodeError::InvalidUnicodeEscape(format_char(c))));
            };
            value = (value << 4) | u16::try_from(digit).expect("hex digit fits in u16");
        }
        Ok(value)
    }

    /// Captures the maximal run of number-legal characters, then checks the
    /// whole lexeme against the strict grammar. A lexeme of legal characters
    /// in an illegal arrangement fails here, at token-boundary time.
    fn lex_number(&mut self) -> Result<()> {
        self.scratch.clear();
        while let Some(c) = self.peek_char()? {
            if matches!(c, '0'..='9' | '+' | '-' | '.' | 'e' | 'E') {
                self.next_char()?;
                self.scratch.push(c);
            } else {
                break;
            }
        }
        if number::validate_lexeme(&self.scratch) {
            Ok(())
        } else {
            Err(self.syntax(DecodeError::MalformedNumber(self.scratch.clone())))
        }
    }

    /// Matches `literal` character-for-character, then requires a token
    /// boundary: a literal running straight into another word character
    /// (`nulle`, `truex`) fails here, like a malformed number lexeme.
    fn expect_literal(&mut self, literal: &'static str) -> Result<()> {
        for expected in literal.chars() {
            match self.next_char()? {
                Some(c) if c == expected => {}
                Some(c) => {
                    return Err(self.syntax(DecodeError::UnexpectedCharacter(format_char(c))));
                }
                None => return Err(self.syntax(DecodeError::UnexpectedEof)),
            }
        }
        if let Some(c) = self.peek_char()? {
            if c.is_ascii_alphanumeric() {
                return Err(self.syntax(DecodeError::UnexpectedCharacter(format_char(c))));
            }
        }
        Ok(())
    }

    fn skip_whitespace(&mut self) -> Result<()> {
        while let Some(c) = self.peek_char()? {
            if matches!(c, ' ' | '\t' | '\r' | '\n') {
                self.next_char()?;
            } else {
                break;
            }
        }
        Ok(())
    }

    // --- character access ------------------------------------------------

    /// Decodes the next scalar without consuming it, filling the buffer as
    /// needed. `None` means end of input.
    fn peek_char(&mut self) -> Result<Option<char>> {
        Ok(self.decode_next()?.map(|(c, _)| c))
    }

    /// Decodes and consumes the next scalar, tracking line/column.
    fn next_char(&mut self) -> Result<Option<char>> {
        let Some((c, len)) = self.decode_next()? else {
            return Ok(None);
        };
        self.buf.consume(len);
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Ok(Some(c))
    }

    fn decode_next(&mut self) -> Result<Option<(char, usize)>> {
        loop {
            let encoding = match self.encoding {
                Some(e) => e,
                None => self.detect_encoding()?,
            };
            match decoder::decode_char(encoding, self.buf.unread(), self.eof) {
                Ok(DecodeStep::Char(c, len)) => return Ok(Some((c, len))),
                Ok(DecodeStep::Empty) if self.eof => return Ok(None),
                Ok(DecodeStep::Empty | DecodeStep::NeedMore) => {
                    if self.buf.fill(&mut self.source)? == 0 {
                        self.eof = true;
                    }
                }
                Err(e) => return Err(self.syntax(e)),
            }
        }
    }

    /// Buffers the first four bytes and runs RFC 4627 detection, consuming
    /// any byte-order mark.
    fn detect_encoding(&mut self) -> Result<Encoding> {
        while self.buf.unread().len() < 4 && !self.eof {
            if self.buf.fill(&mut self.source)? == 0 {
                self.eof = true;
            }
        }
        let (encoding, bom_len) = Encoding::detect(self.buf.unread());
        self.buf.consume(bom_len);
        self.encoding = Some(encoding);
        Ok(encoding)
    }

    // --- helpers ----------------------------------------------------------

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(Error::Usage("reader is closed"));
        }
        Ok(())
    }

    fn expect_event(&self, event: Event, message: &'static str) -> Result<()> {
        self.ensure_open()?;
        if self.grammar.current_event() == Some(event) {
            Ok(())
        } else {
            Err(Error::Usage(message))
        }
    }

    fn syntax(&self, source: DecodeError) -> Error {
        Error::Syntax {
            source,
            line: self.line,
            column: self.column,
        }
    }
}

/// JSON forbids raw C0 controls in strings; this codec also rejects DEL and
/// the C1 range, which round-trip via `\uXXXX` instead.
fn is_rejected_control(c: char) -> bool {
    matches!(c, '\u{0000}'..='\u{001F}' | '\u{007F}'..='\u{009F}')
}
