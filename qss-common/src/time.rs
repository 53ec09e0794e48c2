//! Timestamp utilities and visit duration format checks

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Check that `s` is a strict `HH:MM:SS` duration.
///
/// Accepts exactly two zero-padded digits per component with hours in
/// `00..=23` and minutes/seconds in `00..=59`. Surrounding whitespace,
/// extra characters and short components are rejected.
///
/// # Examples
///
/// ```
/// use qss_common::time::validate_time_format;
///
/// assert!(validate_time_format("01:30:00"));
/// assert!(validate_time_format("23:59:59"));
/// assert!(!validate_time_format("24:00:00"));
/// assert!(!validate_time_format("1:30"));
/// assert!(!validate_time_format(" 12:30:45 "));
/// ```
pub fn validate_time_format(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() != 8 || bytes[2] != b':' || bytes[5] != b':' {
        return false;
    }

    let component = |at: usize, max: u8| -> bool {
        let (hi, lo) = (bytes[at], bytes[at + 1]);
        if !hi.is_ascii_digit() || !lo.is_ascii_digit() {
            return false;
        }
        (hi - b'0') * 10 + (lo - b'0') <= max
    };

    component(0, 23) && component(3, 59) && component(6, 59)
}

/// JSON-facing variant of [`validate_time_format`]: non-string values are invalid.
pub fn is_valid_time_value(value: &Value) -> bool {
    value.as_str().map(validate_time_format).unwrap_or(false)
}
