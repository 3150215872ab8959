//! Lexical grammars for flag value text.
//!
//! Free functions shared by every value container: the base-detecting
//! integer grammar (`0x` hex, `0o` octal, `0b` binary, a bare leading zero
//! is octal), the boolean lexicon, and the duration grammar
//! (`300ms`, `1.5h`, `2h45m`, units `ns`/`us`/`µs`/`ms`/`s`/`m`/`h`).

use std::time::Duration;

use crate::value::ValueError;

/// Parses the boolean lexicon accepted on the command line.
///
/// # Examples
///
/// ```
/// use flagline_core::parse_bool;
///
/// assert_eq!(parse_bool("true"), Ok(true));
/// assert_eq!(parse_bool("0"), Ok(false));
/// assert!(parse_bool("yes").is_err());
/// ```
pub fn parse_bool(text: &str) -> Result<bool, ValueError> {
    match text {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        _ => Err(ValueError::InvalidBool(text.to_string())),
    }
}

/// Strips an optional radix prefix, returning the radix and the digits.
fn split_radix(digits: &str) -> (u32, &str) {
    let bytes = digits.as_bytes();
    if bytes.len() >= 2 && bytes[0] == b'0' {
        return match bytes[1] {
            b'x' | b'X' => (16, &digits[2..]),
            b'o' | b'O' => (8, &digits[2..]),
            b'b' | b'B' => (2, &digits[2..]),
            _ => (8, &digits[1..]),
        };
    }
    (10, digits)
}

/// Parses a signed integer with radix detection.
pub fn parse_int(text: &str) -> Result<i64, ValueError> {
    let (negative, unsigned) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let (radix, digits) = split_radix(unsigned);
    if digits.is_empty() {
        return Err(ValueError::InvalidInt(text.to_string()));
    }
    let magnitude = i128::from_str_radix(digits, radix)
        .map_err(|_| ValueError::InvalidInt(text.to_string()))?;
    let signed = if negative { -magnitude } else { magnitude };
    i64::try_from(signed).map_err(|_| ValueError::OutOfRange(text.to_string()))
}

/// Parses an unsigned integer with radix detection. No sign is permitted.
pub fn parse_uint(text: &str) -> Result<u64, ValueError> {
    let (radix, digits) = split_radix(text);
    if digits.is_empty() {
        return Err(ValueError::InvalidUint(text.to_string()));
    }
    u64::from_str_radix(digits, radix).map_err(|source| match source.kind() {
        std::num::IntErrorKind::PosOverflow => ValueError::OutOfRange(text.to_string()),
        _ => ValueError::InvalidUint(text.to_string()),
    })
}

/// Parses a floating point value.
pub fn parse_float(text: &str) -> Result<f64, ValueError> {
    text.parse::<f64>()
        .map_err(|_| ValueError::InvalidFloat(text.to_string()))
}

/// Parses a duration as a sequence of decimal numbers with units, e.g.
/// `300ms`, `1.5h`, or `2h45m`. Bare `0` is the zero duration. Negative
/// durations are rejected.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use flagline_core::parse_duration;
///
/// assert_eq!(parse_duration("1m30s"), Ok(Duration::from_secs(90)));
/// assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
/// assert!(parse_duration("10 minutes").is_err());
/// ```
pub fn parse_duration(text: &str) -> Result<Duration, ValueError> {
    let fail = || ValueError::InvalidDuration(text.to_string());
    let mut rest = text.strip_prefix('+').unwrap_or(text);
    if rest.starts_with('-') {
        // std durations are unsigned; a negative span has no representation.
        return Err(fail());
    }
    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(fail());
    }
    let mut total = Duration::ZERO;
    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(rest.len());
        let number = &rest[..number_end];
        if number.is_empty() || number == "." {
            return Err(fail());
        }
        let quantity: f64 = number.parse().map_err(|_| fail())?;
        rest = &rest[number_end..];
        let unit_end = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let unit = &rest[..unit_end];
        let scale = match unit {
            "ns" => 1e-9,
            "us" | "µs" | "μs" => 1e-6,
            "ms" => 1e-3,
            "s" => 1.0,
            "m" => 60.0,
            "h" => 3600.0,
            _ => return Err(fail()),
        };
        let span = Duration::try_from_secs_f64(quantity * scale)
            .map_err(|_| ValueError::OutOfRange(text.to_string()))?;
        total = total
            .checked_add(span)
            .ok_or_else(|| ValueError::OutOfRange(text.to_string()))?;
        rest = &rest[unit_end..];
    }
    Ok(total)
}

/// Renders `value` with its fractional part in the given unit, trimming
/// trailing zeros: `1500000ns` over `1000000` becomes `1.5ms`.
fn scaled(value: u128, divisor: u128, width: usize, unit: &str) -> String {
    let whole = value / divisor;
    let fraction = value % divisor;
    if fraction == 0 {
        return format!("{whole}{unit}");
    }
    let mut digits = format!("{fraction:0width$}");
    while digits.ends_with('0') {
        digits.pop();
    }
    format!("{whole}.{digits}{unit}")
}

/// Formats a duration in the compact unit form `parse_duration` accepts:
/// `0s`, sub-second values in a single unit, larger values as `XhYmZs`.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use flagline_core::format_duration;
///
/// assert_eq!(format_duration(Duration::from_secs(90)), "1m30s");
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
/// ```
pub fn format_duration(value: Duration) -> String {
    if value.is_zero() {
        return "0s".to_string();
    }
    let nanos = value.as_nanos();
    if nanos < 1_000 {
        return format!("{nanos}ns");
    }
    if nanos < 1_000_000 {
        return scaled(nanos, 1_000, 3, "µs");
    }
    if nanos < 1_000_000_000 {
        return scaled(nanos, 1_000_000, 6, "ms");
    }
    let seconds = nanos / 1_000_000_000;
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let second_nanos = (seconds % 60) * 1_000_000_000 + nanos % 1_000_000_000;
    let tail = scaled(second_nanos, 1_000_000_000, 9, "s");
    match (hours, minutes) {
        (0, 0) => tail,
        (0, m) => format!("{m}m{tail}"),
        (h, m) => format!("{h}h{m}m{tail}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_lexicon() {
        for text in ["1", "t", "T", "true", "TRUE", "True"] {
            assert_eq!(parse_bool(text), Ok(true), "{text}");
        }
        for text in ["0", "f", "F", "false", "FALSE", "False"] {
            assert_eq!(parse_bool(text), Ok(false), "{text}");
        }
        assert!(parse_bool("yes").is_err());
        assert!(parse_bool("").is_err());
    }

    #[test]
    fn test_parse_int_radix_detection() {
        assert_eq!(parse_int("500"), Ok(500));
        assert_eq!(parse_int("-42"), Ok(-42));
        assert_eq!(parse_int("+42"), Ok(42));
        assert_eq!(parse_int("0x1f"), Ok(31));
        assert_eq!(parse_int("0X1F"), Ok(31));
        assert_eq!(parse_int("0o17"), Ok(15));
        assert_eq!(parse_int("017"), Ok(15));
        assert_eq!(parse_int("0b101"), Ok(5));
        assert_eq!(parse_int("0"), Ok(0));
    }

    #[test]
    fn test_parse_int_rejects_malformed() {
        assert!(parse_int("").is_err());
        assert!(parse_int("-").is_err());
        assert!(parse_int("red").is_err());
        assert!(parse_int("0x").is_err());
        assert!(parse_int("12.5").is_err());
    }

    #[test]
    fn test_parse_int_range() {
        assert_eq!(parse_int("9223372036854775807"), Ok(i64::MAX));
        assert_eq!(parse_int("-9223372036854775808"), Ok(i64::MIN));
        assert_eq!(
            parse_int("9223372036854775808"),
            Err(ValueError::OutOfRange("9223372036854775808".to_string()))
        );
    }

    #[test]
    fn test_parse_uint_rejects_sign() {
        assert_eq!(parse_uint("500"), Ok(500));
        assert_eq!(parse_uint("0xff"), Ok(255));
        assert!(parse_uint("-1").is_err());
        assert!(parse_uint("+1").is_err());
    }

    #[test]
    fn test_parse_float() {
        assert_eq!(parse_float("500.0"), Ok(500.0));
        assert_eq!(parse_float("500"), Ok(500.0));
        assert_eq!(parse_float("-2.5e3"), Ok(-2500.0));
        assert!(parse_float("red").is_err());
    }

    #[test]
    fn test_parse_duration_forms() {
        assert_eq!(parse_duration("0"), Ok(Duration::ZERO));
        assert_eq!(parse_duration("500s"), Ok(Duration::from_secs(500)));
        assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
        assert_eq!(parse_duration("2h45m"), Ok(Duration::from_secs(9900)));
        assert_eq!(parse_duration("1.5s"), Ok(Duration::from_millis(1500)));
        assert_eq!(parse_duration("10µs"), Ok(Duration::from_micros(10)));
    }

    #[test]
    fn test_parse_duration_rejects_malformed() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("5").is_err());
        assert!(parse_duration("s").is_err());
        assert!(parse_duration("5 s").is_err());
        assert!(parse_duration("5d").is_err());
        assert!(parse_duration("-5s").is_err());
        assert!(parse_duration(".s").is_err());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::ZERO), "0s");
        assert_eq!(format_duration(Duration::from_nanos(500)), "500ns");
        assert_eq!(format_duration(Duration::from_micros(1500)), "1.5ms");
        assert_eq!(format_duration(Duration::from_secs(1)), "1s");
        assert_eq!(format_duration(Duration::from_secs(500)), "8m20s");
        assert_eq!(format_duration(Duration::from_secs(3600)), "1h0m0s");
        assert_eq!(format_duration(Duration::from_secs(5445)), "1h30m45s");
    }

    #[test]
    fn test_duration_round_trip() {
        for text in ["1s", "8m20s", "1h0m0s", "250ms", "500ns"] {
            let parsed = parse_duration(text).unwrap();
            assert_eq!(format_duration(parsed), text);
        }
    }
}
