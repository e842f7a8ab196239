//! CG timestamp normalization.
//!
//! The profile shows achievement times like `3rd Feb 2024, 18:22 UTC` or,
//! for scores set this year, `3rd Feb, 18:22 +0900`. Both forms are turned
//! into epoch milliseconds.

use chrono::{DateTime, Datelike, Utc};

use crate::error::ParseError;

/// Parse a CG timestamp into epoch milliseconds.
///
/// The year-bearing form is tried first; the year-omitted form assumes the
/// current year. A literal `UTC` token stands in for `+0000`.
pub fn parse_timestamp(raw: &str) -> Result<i64, ParseError> {
    parse_timestamp_with_year(raw, Utc::now().year())
}

/// Like [`parse_timestamp`], with the fallback year made explicit.
pub fn parse_timestamp_with_year(raw: &str, fallback_year: i32) -> Result<i64, ParseError> {
    let cleaned = strip_ordinal(raw.trim()).replace("UTC", "+0000");

    if let Ok(dt) = DateTime::parse_from_str(&cleaned, "%d %b %Y, %H:%M %z") {
        return Ok(dt.timestamp_millis());
    }

    // No 4-digit year next to the month abbreviation; inject the fallback.
    let with_year = match cleaned.split_once(',') {
        Some((day_month, rest)) => {
            format!("{} {}, {}", day_month.trim_end(), fallback_year, rest.trim_start())
        }
        None => return Err(ParseError::InvalidTimestamp(raw.to_string())),
    };

    DateTime::parse_from_str(&with_year, "%d %b %Y, %H:%M %z")
        .map(|dt| dt.timestamp_millis())
        .map_err(|_| ParseError::InvalidTimestamp(raw.to_string()))
}

/// Drop the ordinal suffix from a leading day number (`21st` -> `21`).
fn strip_ordinal(s: &str) -> String {
    let digits = s.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return s.to_string();
    }
    let rest = &s[digits..];
    let suffix = rest.chars().take_while(|c| c.is_ascii_alphabetic()).count();
    format!("{}{}", &s[..digits], &rest[suffix..])
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn utc_millis(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> i64 {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0)
            .unwrap()
            .timestamp_millis()
    }

    #[test]
    fn year_bearing_utc_token() {
        let millis = parse_timestamp_with_year("1st Jan 2024, 13:05 UTC", 1999).unwrap();
        assert_eq!(millis, utc_millis(2024, 1, 1, 13, 5));
    }

    #[test]
    fn year_omitted_with_numeric_offset() {
        let millis = parse_timestamp_with_year("2nd Mar, 09:00 +0900", 2024).unwrap();
        // 09:00 +0900 is midnight UTC
        assert_eq!(millis, utc_millis(2024, 3, 2, 0, 0));
    }

    #[test]
    fn ordinal_suffixes_are_ignored() {
        let a = parse_timestamp_with_year("21st Jun 2023, 08:30 +0000", 1999).unwrap();
        let b = parse_timestamp_with_year("21 Jun 2023, 08:30 +0000", 1999).unwrap();
        assert_eq!(a, b);

        let c = parse_timestamp_with_year("3rd Nov 2022, 23:59 UTC", 1999).unwrap();
        assert_eq!(c, utc_millis(2022, 11, 3, 23, 59));
    }

    #[test]
    fn negative_offset() {
        let millis = parse_timestamp_with_year("4th Jul 2023, 20:00 -0500", 1999).unwrap();
        assert_eq!(millis, utc_millis(2023, 7, 5, 1, 0));
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(parse_timestamp_with_year("not a date", 2024).is_err());
        assert!(parse_timestamp_with_year("", 2024).is_err());
        assert!(parse_timestamp_with_year("1st Jan 2024", 2024).is_err());
    }
}
