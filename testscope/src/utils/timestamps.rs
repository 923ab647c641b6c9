//! Timestamp helpers for report entries.

use chrono::{DateTime, Utc};

/// Represents a timestamp that can be serialized/deserialized.
pub type Timestamp = DateTime<Utc>;

/// Returns the current UTC timestamp.
#[must_use]
pub fn now_utc() -> Timestamp {
    Utc::now()
}

/// Formats a timestamp as an ISO 8601 string with microsecond precision.
///
/// # Examples
///
/// ```
/// use chrono::TimeZone;
/// use testscope::utils::format_iso8601;
///
/// let ts = chrono::Utc.with_ymd_and_hms(2016, 3, 1, 12, 0, 0).unwrap();
/// assert_eq!(format_iso8601(&ts), "2016-03-01T12:00:00.000000+00:00");
/// ```
#[must_use]
pub fn format_iso8601(dt: &Timestamp) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.6f+00:00").to_string()
}

/// Returns the current UTC time as an ISO 8601 formatted string.
#[must_use]
pub fn iso_timestamp() -> String {
    format_iso8601(&now_utc())
}
