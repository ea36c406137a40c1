//! Datetime parsing and rendering.
//!
//! The API accepts several client-supplied datetime shapes and always
//! renders one canonical form. The store uses a fixed-width UTC text format
//! so that lexicographic comparison in SQL equals chronological comparison.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Render format for API responses: millisecond precision, `Z` suffix.
const API_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Render format for stored timestamps: microsecond precision, `Z` suffix.
///
/// Always six fractional digits, so stored values are fixed-width and
/// order correctly as text.
const STORE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Naive formats accepted on input, tried in order.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a client-supplied datetime.
///
/// Accepts RFC 3339 (any offset, normalized to UTC), the naive forms in
/// [`NAIVE_FORMATS`] and a bare date (midnight). Naive values are taken as
/// UTC. Returns `None` if no format matches.
#[must_use]
pub fn parse_datetime(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Some(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }

    None
}

/// Render a datetime for API responses.
#[must_use]
pub fn format_api(dt: DateTime<Utc>) -> String {
    dt.format(API_FORMAT).to_string()
}

/// Render a datetime for storage.
#[must_use]
pub fn format_store(dt: DateTime<Utc>) -> String {
    dt.format(STORE_FORMAT).to_string()
}

/// Parse a stored timestamp back into a datetime.
#[must_use]
pub fn parse_store(input: &str) -> Option<DateTime<Utc>> {
    parse_datetime(input)
}
