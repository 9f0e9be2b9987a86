//! Character-set detection and incremental character decoding.
//!
//! JSON text arrives as bytes; per RFC 4627 the encoding of a conforming
//! stream can be determined from the first four bytes (a BOM if present,
//! otherwise the null-byte pattern around the opening bracket). The decoder
//! detects once, then yields one `char` at a time from the unread byte
//! window without ever allocating an intermediate string.

use crate::error::DecodeError;

/// Character encodings accepted on input. Output is always UTF-8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// UTF-8 (the default when detection is inconclusive).
    Utf8,
    /// UTF-16, big-endian.
    Utf16Be,
    /// UTF-16, little-endian.
    Utf16Le,
    /// UTF-32, big-endian.
    Utf32Be,
    /// UTF-32, little-endian.
    Utf32Le,
}

impl Encoding {
    pub(crate) fn name(self) -> &'static str {
        match self {
            Encoding::Utf8 => "UTF-8",
            Encoding::Utf16Be => "UTF-16BE",
            Encoding::Utf16Le => "UTF-16LE",
            Encoding::Utf32Be => "UTF-32BE",
            Encoding::Utf32Le => "UTF-32LE",
        }
    }

    /// Detects the stream encoding from its first bytes, returning the
    /// encoding and the number of BOM bytes to skip.
    ///
    /// BOMs win; otherwise RFC 4627's observation applies: the first two
    /// characters of legacy JSON text are ASCII, so the placement of null
    /// bytes identifies the encoding. Fewer than four bytes of lookahead
    /// (a tiny document) falls back to UTF-8.
    pub(crate) fn detect(prefix: &[u8]) -> (Self, usize) {
        match prefix {
            [0x00, 0x00, 0xFE, 0xFF, ..] => (Encoding::Utf32Be, 4),
            [0xFF, 0xFE, 0x00, 0x00, ..] => (Encoding::Utf32Le, 4),
            [0xFE, 0xFF, ..] => (Encoding::Utf16Be, 2),
            [0xFF, 0xFE, ..] => (Encoding::Utf16Le, 2),
            [0xEF, 0xBB, 0xBF, ..] => (Encoding::Utf8, 3),
            [0x00, 0x00, 0x00, _, ..] => (Encoding::Utf32Be, 0),
            [_, 0x00, 0x00, 0x00, ..] => (Encoding::Utf32Le, 0),
            [0x00, _, 0x00, _, ..] | [0x00, _, ..] => (Encoding::Utf16Be, 0),
            [_, 0x00, _, 0x00, ..] => (Encoding::Utf16Le, 0),
            [_, 0x00] => (Encoding::Utf16Le, 0),
            _ => (Encoding::Utf8, 0),
        }
    }
}

/// One decoding step over the unread byte window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DecodeStep {
    /// A scalar and the number of bytes it consumed.
    Char(char, usize),
    /// The window ends mid-sequence; fill the buffer and retry.
    NeedMore,
    /// The window is empty.
    Empty,
}

/// Decodes the first scalar of `bytes`. `eof` turns would-be `NeedMore`
/// outcomes into hard failures, since no further bytes can complete the
/// sequence.
pub(crate) fn decode_char(
    encoding: Encoding,
    bytes: &[u8],
    eof: bool,
) -> Result<DecodeStep, DecodeError> {
    if bytes.is_empty() {
        return Ok(DecodeStep::Empty);
    }
    match encoding {
        Encoding::Utf8 => decode_utf8(bytes, eof),
        Encoding::Utf16Be => decode_utf16(bytes, eof, u16::from_be_bytes, Encoding::Utf16Be),
        Encoding::Utf16Le => decode_utf16(bytes, eof, u16::from_le_bytes, Encoding::Utf16Le),
        Encoding::Utf32Be => decode_utf32(bytes, eof, u32::from_be_bytes, Encoding::Utf32Be),
        Encoding::Utf32Le => decode_utf32(bytes, eof, u32::from_le_bytes, Encoding::Utf32Le),
    }
}

fn decode_utf8(bytes: &[u8], eof: bool) -> Result<DecodeStep, DecodeError> {
    match bstr::decode_utf8(bytes) {
        (Some(ch), len) => Ok(DecodeStep::Char(ch, len)),
        // An ill-formed prefix that reaches the end of the window may just
        // be a code point split across fills.
        (None, len) if !eof && len == bytes.len() => Ok(DecodeStep::NeedMore),
        (None, _) => Err(DecodeError::MalformedEncoding(Encoding::Utf8.name())),
    }
}

fn decode_utf16(
    bytes: &[u8],
    eof: bool,
    from_bytes: fn([u8; 2]) -> u16,
    encoding: Encoding,
) -> Result<DecodeStep, DecodeError> {
    let Some(&[a, b]) = bytes.first_chunk::<2>() else {
        return incomplete(eof, encoding);
    };
    let unit = from_bytes([a, b]);
    match unit {
        0xD800..=0xDBFF => {
            let Some(&[c, d]) = bytes[2..].first_chunk::<2>() else {
                return incomplete(eof, encoding);
            };
            let low = from_bytes([c, d]);
            if !(0xDC00..=0xDFFF).contains(&low) {
                return Err(DecodeError::MalformedEncoding(encoding.name()));
            }
            let scalar =
                0x10000 + ((u32::from(unit) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
            let ch = char::from_u32(scalar)
                .ok_or(DecodeError::MalformedEncoding(encoding.name()))?;
            Ok(DecodeStep::Char(ch, 4))
        }
        0xDC00..=0xDFFF => Err(DecodeError::MalformedEncoding(encoding.name())),
        _ => Ok(DecodeStep::Char(
            char::from_u32(u32::from(unit)).expect("non-surrogate BMP unit"),
            2,
        )),
    }
}

fn decode_utf32(
    bytes: &[u8],
    eof: bool,
    from_bytes: fn([u8; 4]) -> u32,
    encoding: Encoding,
) -> Result<DecodeStep, DecodeError> {
    let Some(&quad) = bytes.first_chunk::<4>() else {
        return incomplete(eof, encoding);
    };
    let scalar = from_bytes(quad);
    char::from_u32(scalar)
        .map(|ch| DecodeStep::Char(ch, 4))
        .ok_or(DecodeError::MalformedEncoding(encoding.name()))
}

fn incomplete(eof: bool, encoding: Encoding) -> Result<DecodeStep, DecodeError> {
    if eof {
        Err(DecodeError::MalformedEncoding(encoding.name()))
    } else {
        Ok(DecodeStep::NeedMore)
    }
}
