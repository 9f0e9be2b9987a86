//! Number lexemes: strict grammar validation and integer text encoding.
//!
//! The reader validates captured lexemes with [`validate_lexeme`] at token
//! boundary; the writer reuses the same check for caller-supplied lexemes
//! and encodes integers through the digit-pair table below.

use core::fmt;
use core::str::FromStr;

use crate::error::Error;

/// Accepts exactly the JSON number grammar:
/// `-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?`, consuming the whole
/// input. Leading zeros, bare dots, dangling exponents, and leading `+` are
/// all rejected.
pub(crate) fn validate_lexeme(lexeme: &str) -> bool {
    let mut bytes = lexeme.as_bytes();

    if let [b'-', rest @ ..] = bytes {
        bytes = rest;
    }

    // Integer part: a single 0, or a nonzero digit followed by any digits.
    bytes = match bytes {
        [b'0', rest @ ..] => rest,
        [b'1'..=b'9', rest @ ..] => skip_digits(rest),
        _ => return false,
    };

    if let [b'.', rest @ ..] = bytes {
        if !rest.first().is_some_and(u8::is_ascii_digit) {
            return false;
        }
        bytes = skip_digits(rest);
    }

    if let [b'e' | b'E', rest @ ..] = bytes {
        let rest = match rest {
            [b'+' | b'-', r @ ..] => r,
            r => r,
        };
        if !rest.first().is_some_and(u8::is_ascii_digit) {
            return false;
        }
        bytes = skip_digits(rest);
    }

    bytes.is_empty()
}

fn skip_digits(mut bytes: &[u8]) -> &[u8] {
    while let [b'0'..=b'9', rest @ ..] = bytes {
        bytes = rest;
    }
    bytes
}

/// Two characters per remainder, so large integers cost half the divisions
/// of a digit-at-a-time loop.
static DIGIT_PAIRS: &[u8; 200] = b"0001020304050607080910111213141516171819\
                                   2021222324252627282930313233343536373839\
                                   4041424344454647484950515253545556575859\
                                   6061626364656667686970717273747576777879\
                                   8081828384858687888990919293949596979899";

/// Longest encoding we ever produce: `-` plus the 39 digits of `u128::MAX`.
const MAX_INT_DIGITS: usize = 40;

/// Appends the canonical decimal text of `value` to `out`, writing digits
/// backward into a stack span to avoid a reversal pass.
pub(crate) fn encode_u128(value: u128, out: &mut Vec<u8>) {
    let mut span = [0u8; MAX_INT_DIGITS];
    let mut pos = span.len();
    let mut n = value;
    while n >= 100 {
        let pair = ((n % 100) as usize) * 2;
        n /= 100;
        pos -= 2;
        span[pos] = DIGIT_PAIRS[pair];
        span[pos + 1] = DIGIT_PAIRS[pair + 1];
    }
    if n >= 10 {
        let pair = (n as usize) * 2;
        pos -= 2;
        span[pos] = DIGIT_PAIRS[pair];
        span[pos + 1] = DIGIT_PAIRS[pair + 1];
    } else {
        pos -= 1;
        span[pos] = b'0' + n as u8;
    }
    out.extend_from_slice(&span[pos..]);
}

/// Signed companion of [`encode_u128`]; `i128::MIN` is handled through the
/// unsigned magnitude.
pub(crate) fn encode_i128(value: i128, out: &mut Vec<u8>) {
    if value < 0 {
        out.push(b'-');
    }
    encode_u128(value.unsigned_abs(), out);
}

/// An exact-decimal-text JSON number.
///
/// Holds the lexeme verbatim, so values beyond any machine range survive a
/// read/write round-trip unchanged. Equality is textual.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Number(String);

impl Number {
    /// Validates `lexeme` against the JSON number grammar.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNumberLiteral`] when the text does not match
    /// the grammar.
    pub fn from_lexeme(lexeme: &str) -> Result<Self, Error> {
        if validate_lexeme(lexeme) {
            Ok(Self(lexeme.to_owned()))
        } else {
            Err(Error::InvalidNumberLiteral(lexeme.to_owned()))
        }
    }

    pub(crate) fn from_valid(lexeme: String) -> Self {
        debug_assert!(validate_lexeme(&lexeme));
        Self(lexeme)
    }

    /// The exact decimal text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the lexeme on demand with the target type's own rules.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NumberConvert`] when the value does not fit or the
    /// target type cannot represent the text.
    pub fn parse<T: FromStr>(&self) -> Result<T, Error>
    where
        T::Err: fmt::Display,
    {
        self.0.parse().map_err(|e: T::Err| Error::NumberConvert {
            lexeme: self.0.clone(),
            reason: e.to_string(),
        })
    }
}

impl From<i64> for Number {
    fn from(v: i64) -> Self {
        let mut out = Vec::new();
        encode_i128(i128::from(v), &mut out);
        Self(String::from_utf8(out).expect("digits are ASCII"))
    }
}

impl From<u64> for Number {
    fn from(v: u64) -> Self {
        let mut out = Vec::new();
        encode_u128(u128::from(v), &mut out);
        Self(String::from_utf8(out).expect("digits are ASCII"))
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("0")]
    #[case("-0")]
    #[case("0.0")]
    #[case("1")]
    #[case("-1")]
    #[case("10")]
    #[case("1e10")]
    #[case("1E-10")]
    #[case("1.25e+3")]
    #[case("123456789012345678901234567890123456789012345678")]
    fn accepts_conformant_lexemes(#[case] lexeme: &str) {
        assert!(validate_lexeme(lexeme), "{lexeme}");
    }

    #[rstest]
    #[case("")]
    #[case("01")]
    #[case(".5")]
    #[case("1.")]
    #[case("1e")]
    #[case("1e+")]
    #[case("+1")]
    #[case("-")]
    #[case("--1")]
    #[case("1.2.3")]
    #[case("1e5e5")]
    #[case("0x10")]
    #[case("1 ")]
    fn rejects_malformed_lexemes(#[case] lexeme: &str) {
        assert!(!validate_lexeme(lexeme), "{lexeme}");
    }

    #[test]
    fn encodes_small_integers() {
        let mut out = Vec::new();
        encode_u128(0, &mut out);
        out.push(b',');
        encode_u128(7, &mut out);
        out.push(b',');
        encode_u128(42, &mut out);
        out.push(b',');
        encode_u128(100, &mut out);
        assert_eq!(out, b"0,7,42,100");
    }

    #[test]
    fn encodes_extremes() {
        let mut out = Vec::new();
        encode_u128(u128::MAX, &mut out);
        assert_eq!(out, u128::MAX.to_string().as_bytes());

        out.clear();
        encode_i128(i128::MIN, &mut out);
        assert_eq!(out, i128::MIN.to_string().as_bytes());
    }

    #[test]
    fn number_preserves_exact_text() {
        let n = Number::from_lexeme("1.2300e+02").unwrap();
        assert_eq!(n.as_str(), "1.2300e+02");
        assert_eq!(n.parse::<f64>().unwrap(), 123.0);
    }

    #[test]
    fn number_conversion_failures_are_distinct() {
        let n = Number::from_lexeme("99999999999999999999").unwrap();
        assert!(matches!(
            n.parse::<i64>(),
            Err(Error::NumberConvert { .. })
        ));
    }
}
