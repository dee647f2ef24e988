//! Tolerant numeric parsing for free-text session fields.
//!
//! Durations are stored as human-readable labels ("20 min", "1h 15'", "RPE 7").
//! Every numeric operation in the engine goes through [`parse_minutes`] so the
//! interpretation of a label is decided in exactly one place.

use std::sync::LazyLock;

use regex::Regex;

/// First maximal run of ASCII digits.
static DIGITS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").unwrap());

/// Leading integer with optional sign, after leading whitespace.
static LEADING_INT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([+-]?[0-9]+)").unwrap());

/// Extracts the minute count from a duration label.
///
/// Returns the first run of decimal digits as an integer, or 0 when the text
/// contains no digits. Runs too large for an `i64` also yield 0.
///
/// ```
/// use tp_core::parse_minutes;
///
/// assert_eq!(parse_minutes("20 min"), 20);
/// assert_eq!(parse_minutes("approx. 45-50'"), 45);
/// assert_eq!(parse_minutes("open"), 0);
/// ```
pub fn parse_minutes(text: &str) -> i64 {
    DIGITS_RE
        .find(text)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Parses a leading integer the way rule values are authored ("20", " 5 min", "-3").
///
/// Returns `None` when the text does not start with a number.
pub fn parse_int(text: &str) -> Option<i64> {
    LEADING_INT_RE
        .captures(text)
        .and_then(|caps| caps[1].parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minutes_takes_first_digit_run() {
        assert_eq!(parse_minutes("30 min"), 30);
        assert_eq!(parse_minutes("min 12 then 40"), 12);
        assert_eq!(parse_minutes("RPE 7"), 7);
        assert_eq!(parse_minutes("90"), 90);
    }

    #[test]
    fn test_parse_minutes_without_digits_is_zero() {
        assert_eq!(parse_minutes(""), 0);
        assert_eq!(parse_minutes("Alta"), 0);
        assert_eq!(parse_minutes("sin duración"), 0);
    }

    #[test]
    fn test_parse_minutes_ignores_sign_and_decimals() {
        // Only the digit run counts, so "-5" is 5 and "2.5" is 2.
        assert_eq!(parse_minutes("-5 min"), 5);
        assert_eq!(parse_minutes("2.5h"), 2);
    }

    #[test]
    fn test_parse_minutes_overflow_is_zero() {
        assert_eq!(parse_minutes("99999999999999999999999 min"), 0);
    }

    #[test]
    fn test_parse_int_reads_leading_number() {
        assert_eq!(parse_int("20"), Some(20));
        assert_eq!(parse_int("  5 min"), Some(5));
        assert_eq!(parse_int("-3"), Some(-3));
        assert_eq!(parse_int("+4"), Some(4));
    }

    #[test]
    fn test_parse_int_rejects_non_numeric_prefix() {
        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("abc"), None);
        assert_eq!(parse_int("min 20"), None);
    }
}
