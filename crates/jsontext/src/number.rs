//! Numeric literal conversions.
//!
//! The reader collects the maximal run of number characters and hands the
//! text here with a desired target representation; parsing picks the
//! narrowest accurate path (single-digit fast path, explicit-radix parse
//! for hex and octal, type-specific parse, big-integer fallback). The
//! writer-side formatters avoid allocation for integers and use `ryu` for
//! shortest-round-trip floats.

use std::fmt;

/// Longest integer literal the big-integer fallback will attempt.
pub(crate) const MAX_INTEGER_LENGTH: usize = 380;

/// An integer parse result: 64-bit when it fits, otherwise the canonical
/// digit string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ParsedInteger {
    I64(i64),
    Big(String),
}

/// Literal-level conversion failures. The reader wraps these with path and
/// position context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum NumberError {
    InvalidInteger(String),
    InvalidNumber(String),
    InvalidDecimal(String),
    Int32Overflow(String),
    TooLargeToParse(String),
}

impl fmt::Display for NumberError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumberError::InvalidInteger(s) => {
                write!(f, "Input string '{s}' is not a valid integer")
            }
            NumberError::InvalidNumber(s) => {
                write!(f, "Input string '{s}' is not a valid number")
            }
            NumberError::InvalidDecimal(s) => {
                write!(f, "Input string '{s}' is not a valid decimal")
            }
            NumberError::Int32Overflow(s) => {
                write!(f, "JSON integer {s} is too large or small for an Int32")
            }
            NumberError::TooLargeToParse(s) => {
                write!(f, "JSON integer {s} is too large to parse")
            }
        }
    }
}

/// Whether `c` can appear in some numeric literal. The scanner collects
/// the maximal run of these before classification.
pub(crate) fn is_number_char(c: char) -> bool {
    c.is_ascii_digit()
        || matches!(c, '.' | '+' | '-' | 'x' | 'X')
        || ('a'..='f').contains(&c)
        || ('A'..='F').contains(&c)
}

/// A leading `0` followed by anything but `.`/`e`/`E` marks a hex or octal
/// literal.
fn non_base10(text: &str) -> bool {
    let mut chars = text.chars();
    chars.next() == Some('0') && !matches!(chars.next(), None | Some('.' | 'e' | 'E'))
}

/// Whether the default read should take the float path: a base-10 literal
/// containing a decimal point or exponent. Hex digits keep `e`/`E` from
/// being an exponent marker, so radix literals are checked first.
pub(crate) fn has_float_markers(text: &str) -> bool {
    !non_base10(text) && text.contains(['.', 'e', 'E'])
}

fn parse_radix(text: &str) -> Result<i64, NumberError> {
    let (digits, radix) = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        (hex, 16)
    } else {
        (&text[1..], 8)
    };
    i64::from_str_radix(digits, radix).map_err(|_| NumberError::InvalidInteger(text.into()))
}

/// Parses an integer literal for the default read: `i64` when it fits,
/// falling back to the canonical digit string for anything larger, up to
/// [`MAX_INTEGER_LENGTH`] characters.
pub(crate) fn parse_integer(text: &str) -> Result<ParsedInteger, NumberError> {
    let mut chars = text.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        // Single-digit fast path.
        if let Some(d) = c.to_digit(10) {
            return Ok(ParsedInteger::I64(i64::from(d)));
        }
        return Err(NumberError::InvalidInteger(text.into()));
    }
    if non_base10(text) {
        return parse_radix(text).map(ParsedInteger::I64);
    }
    match text.parse::<i64>() {
        Ok(v) => Ok(ParsedInteger::I64(v)),
        Err(e) => match e.kind() {
            std::num::IntErrorKind::PosOverflow | std::num::IntErrorKind::NegOverflow => {
                if text.len() > MAX_INTEGER_LENGTH {
                    return Err(NumberError::TooLargeToParse(text.into()));
                }
                // Overflowed i64 but already validated as sign + digits.
                Ok(ParsedInteger::Big(text.into()))
            }
            _ => Err(NumberError::InvalidInteger(text.into())),
        },
    }
}

/// Parses an integer literal directly to `i32`, honoring hex and octal.
pub(crate) fn parse_i32(text: &str) -> Result<i32, NumberError> {
    let mut chars = text.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if let Some(d) = c.to_digit(10) {
            return Ok(d as i32);
        }
        return Err(NumberError::InvalidInteger(text.into()));
    }
    let wide = if non_base10(text) {
        parse_radix(text)?
    } else {
        text.parse::<i64>().map_err(|e| match e.kind() {
            std::num::IntErrorKind::PosOverflow | std::num::IntErrorKind::NegOverflow => {
                NumberError::Int32Overflow(text.into())
            }
            _ => NumberError::InvalidInteger(text.into()),
        })?
    };
    i32::try_from(wide).map_err(|_| NumberError::Int32Overflow(text.into()))
}

/// Parses a literal as `f64`. Hex and octal literals are converted through
/// their integer value.
pub(crate) fn parse_f64(text: &str) -> Result<f64, NumberError> {
    if non_base10(text) {
        #[allow(clippy::cast_precision_loss)]
        return parse_radix(text)
            .map(|v| v as f64)
            .map_err(|_| NumberError::InvalidNumber(text.into()));
    }
    text.parse::<f64>().map_err(|_| NumberError::InvalidNumber(text.into()))
}

/// Parses a literal as a canonical plain-decimal string.
///
/// The strict path accepts `-?digits(.digits)?` verbatim; anything with an
/// exponent falls back to expanding the scientific notation, so inputs
/// like `96.014e-05` succeed even though a strict decimal parser rejects
/// them.
pub(crate) fn parse_decimal(text: &str) -> Result<String, NumberError> {
    if non_base10(text) {
        return parse_radix(text).map(|v| v.to_string());
    }
    if is_plain_decimal(text) {
        return Ok(text.into());
    }
    expand_scientific(text).ok_or_else(|| NumberError::InvalidDecimal(text.into()))
}

fn is_plain_decimal(text: &str) -> bool {
    let body = text.strip_prefix('-').unwrap_or(text);
    if body.is_empty() {
        return false;
    }
    let mut seen_point = false;
    let mut seen_digit = false;
    for c in body.chars() {
        match c {
            '0'..='9' => seen_digit = true,
            '.' if !seen_point => seen_point = true,
            _ => return false,
        }
    }
    seen_digit
}

/// Expands `mantissa e exponent` into a plain decimal string by shifting
/// the decimal point.
fn expand_scientific(text: &str) -> Option<String> {
    let (mantissa, exponent) = text.split_once(['e', 'E'])?;
    let exponent: i32 = exponent.strip_prefix('+').unwrap_or(exponent).parse().ok()?;

    let (negative, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, mantissa),
    };
    if mantissa.is_empty() {
        return None;
    }
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if !int_part.chars().chain(frac_part.chars()).all(|c| c.is_ascii_digit())
        || int_part.len() + frac_part.len() == 0
    {
        return None;
    }

    let digits: String = int_part.chars().chain(frac_part.chars()).collect();
    let point = i64::from(i32::try_from(int_part.len()).ok()?) + i64::from(exponent);

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    if point <= 0 {
        out.push_str("0.");
        for _ in 0..(-point) {
            out.push('0');
        }
        out.push_str(&digits);
    } else if (point as usize) >= digits.len() {
        out.push_str(&digits);
        for _ in 0..(point as usize - digits.len()) {
            out.push('0');
        }
    } else {
        out.push_str(&digits[..point as usize]);
        out.push('.');
        out.push_str(&digits[point as usize..]);
    }
    Some(out)
}

/// Formats an integer by manual digit extraction into the caller's
/// reusable buffer, returning the textual slice.
pub(crate) fn format_i64(value: i64, buf: &mut [u8; 20]) -> &str {
    let negative = value < 0;
    let mut v = value.unsigned_abs();
    let mut i = buf.len();
    loop {
        i -= 1;
        buf[i] = b'0' + (v % 10) as u8;
        v /= 10;
        if v == 0 {
            break;
        }
    }
    if negative {
        i -= 1;
        buf[i] = b'-';
    }
    // Buffer content is ASCII digits and an optional sign.
    std::str::from_utf8(&buf[i..]).unwrap_or("0")
}

/// Formats an unsigned integer the same way; `u64::MAX` is 20 digits, so
/// the shared buffer size still holds.
pub(crate) fn format_u64(value: u64, buf: &mut [u8; 20]) -> &str {
    let mut v = value;
    let mut i = buf.len();
    loop {
        i -= 1;
        buf[i] = b'0' + (v % 10) as u8;
        v /= 10;
        if v == 0 {
            break;
        }
    }
    std::str::from_utf8(&buf[i..]).unwrap_or("0")
}

/// Formats a finite float with `ryu`, appending `.0` when the produced
/// text carries neither a decimal point nor an exponent marker so it stays
/// a valid non-integer literal.
pub(crate) fn format_finite_f64(value: f64, out: &mut String) {
    let mut buf = ryu::Buffer::new();
    let text = buf.format_finite(value);
    out.push_str(text);
    if !text.contains(['.', 'e', 'E']) {
        out.push_str(".0");
    }
}

/// `f32` variant; formatting through `ryu`'s `f32` path keeps the shortest
/// round-trip text instead of the widened `f64` digits.
pub(crate) fn format_finite_f32(value: f32, out: &mut String) {
    let mut buf = ryu::Buffer::new();
    let text = buf.format_finite(value);
    out.push_str(text);
    if !text.contains(['.', 'e', 'E']) {
        out.push_str(".0");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("0", 0)]
    #[case("5", 5)]
    #[case("9", 9)]
    fn single_digit_fast_path(#[case] text: &str, #[case] expected: i64) {
        assert_eq!(parse_integer(text).unwrap(), ParsedInteger::I64(expected));
    }

    #[rstest]
    #[case("0x1A", 26)]
    #[case("0X1a", 26)]
    #[case("010", 8)]
    #[case("-12", -12)]
    #[case("9223372036854775807", i64::MAX)]
    fn integer_literals(#[case] text: &str, #[case] expected: i64) {
        assert_eq!(parse_integer(text).unwrap(), ParsedInteger::I64(expected));
    }

    #[test]
    fn overflow_falls_back_to_big_integer() {
        let text = "9223372036854775808";
        assert_eq!(parse_integer(text).unwrap(), ParsedInteger::Big(text.into()));
        let negative = "-9223372036854775809";
        assert_eq!(
            parse_integer(negative).unwrap(),
            ParsedInteger::Big(negative.into())
        );
    }

    #[test]
    fn oversized_literal_is_rejected() {
        let text = "1".repeat(MAX_INTEGER_LENGTH + 1);
        assert_eq!(
            parse_integer(&text).unwrap_err(),
            NumberError::TooLargeToParse(text)
        );
    }

    #[test]
    fn i32_honors_radix_and_overflow() {
        assert_eq!(parse_i32("0x1A").unwrap(), 26);
        assert_eq!(parse_i32("010").unwrap(), 8);
        assert_eq!(
            parse_i32("2147483648").unwrap_err(),
            NumberError::Int32Overflow("2147483648".into())
        );
    }

    #[test]
    fn decimal_strict_path_preserves_the_literal() {
        assert_eq!(parse_decimal("1.50").unwrap(), "1.50");
        assert_eq!(parse_decimal("-0.25").unwrap(), "-0.25");
    }

    #[test]
    fn decimal_fallback_expands_scientific_notation() {
        assert_eq!(parse_decimal("96.014e-05").unwrap(), "0.00096014");
        assert_eq!(parse_decimal("1.5E3").unwrap(), "1500");
        assert_eq!(parse_decimal("-2e2").unwrap(), "-200");
        assert_eq!(parse_decimal("12.34e1").unwrap(), "123.4");
    }

    #[test]
    fn invalid_decimal_is_rejected() {
        assert_eq!(
            parse_decimal("1.2.3").unwrap_err(),
            NumberError::InvalidDecimal("1.2.3".into())
        );
    }

    #[test]
    fn i64_formatting_extracts_digits() {
        let mut buf = [0u8; 20];
        assert_eq!(format_i64(0, &mut buf), "0");
        assert_eq!(format_i64(-5, &mut buf), "-5");
        assert_eq!(format_i64(i64::MAX, &mut buf), "9223372036854775807");
        assert_eq!(format_i64(i64::MIN, &mut buf), "-9223372036854775808");
    }

    #[test]
    fn float_formatting_repairs_integral_text() {
        let mut out = String::new();
        format_finite_f64(1.0, &mut out);
        assert_eq!(out, "1.0");
        out.clear();
        format_finite_f64(0.1, &mut out);
        assert_eq!(out, "0.1");
    }
}
