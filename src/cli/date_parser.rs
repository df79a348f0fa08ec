//! Date parsing module for CLI arguments
//!
//! Lenient ISO 8601: any leading portion of `YYYY-MM-DDTHH:MM:SS` is accepted
//! and the missing tail defaults to the start of that period, so `2017` means
//! `2017-01-01T00:00:00Z`. Fractional seconds, a trailing `Z` or `+00:00`, and
//! full RFC 3339 with other offsets are accepted too. Results are UTC.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

/// Template supplying the missing tail of a truncated timestamp
const COMPLETION_TEMPLATE: &str = "0000-01-01T00:00:00";

/// Lengths at which a truncated timestamp ends on a component boundary
const TRUNCATION_POINTS: [usize; 6] = [4, 7, 10, 13, 16, 19];

/// Error types for date parsing
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DateParseError {
    #[error("Invalid date format: {input}. Expected ISO 8601 such as 2017, 2017-06 or 2017-06-01T12:30:00Z")]
    InvalidFormat { input: String },
}

/// Parse a possibly truncated ISO 8601 timestamp into a UTC instant
///
/// # Examples
///
/// ```
/// use geosearch::cli::date_parser::parse_lenient;
///
/// let start_of_year = parse_lenient("2017").unwrap();
/// assert_eq!(start_of_year.to_rfc3339(), "2017-01-01T00:00:00+00:00");
///
/// let precise = parse_lenient("2017-06-01T12:30:00Z").unwrap();
/// assert_eq!(precise.to_rfc3339(), "2017-06-01T12:30:00+00:00");
/// ```
pub fn parse_lenient(input: &str) -> Result<DateTime<Utc>, DateParseError> {
    let trimmed = input.trim();
    let invalid = || DateParseError::InvalidFormat { input: input.to_string() };

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    let without_zone = strip_utc_designator(trimmed);
    let normalised = normalise_separator(without_zone);
    let completed = complete_timestamp(&normalised).ok_or_else(invalid)?;

    NaiveDateTime::parse_from_str(&completed, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|_| invalid())
}

/// Like [`parse_lenient`] but discarding the error
pub fn strp_lenient(input: &str) -> Option<DateTime<Utc>> {
    parse_lenient(input).ok()
}

fn strip_utc_designator(input: &str) -> &str {
    input
        .strip_suffix('Z')
        .or_else(|| input.strip_suffix('z'))
        .or_else(|| input.strip_suffix("+00:00"))
        .unwrap_or(input)
}

/// Accept a space between date and time
fn normalise_separator(input: &str) -> String {
    if input.len() > 10 && input.as_bytes()[10] == b' ' {
        format!("{}T{}", &input[..10], &input[11..])
    } else {
        input.to_string()
    }
}

fn complete_timestamp(input: &str) -> Option<String> {
    if !input.is_ascii() {
        return None;
    }
    let len = input.len();
    if len > 19 {
        // Only fractional seconds may follow a full timestamp
        return input[19..].starts_with('.').then(|| input.to_string());
    }
    if !TRUNCATION_POINTS.contains(&len) {
        return None;
    }
    Some(format!("{}{}", input, &COMPLETION_TEMPLATE[len..]))
}
