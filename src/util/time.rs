//! Timestamp helpers for auparse.
//!
//! Audit timestamps are seconds since the epoch plus milliseconds. These
//! helpers convert them to `chrono` types for display and for time-window
//! filtering in the binary.

use chrono::{DateTime, Local, TimeZone, Utc};

/// Convert an audit `(sec, milli)` pair to a UTC `DateTime`.
///
/// Returns `None` when the values fall outside chrono's representable range.
pub fn audit_datetime(sec: u64, milli: u32) -> Option<DateTime<Utc>> {
    let secs = i64::try_from(sec).ok()?;
    Utc.timestamp_opt(secs, milli.min(999) * 1_000_000).single()
}

/// Format an audit timestamp for display in local time.
///
/// Shows full precision including milliseconds, e.g.
/// `2006-03-23 20:43:43.787`. Unrepresentable values fall back to the
/// raw `sec.milli` text.
pub fn format_event_time(sec: u64, milli: u32) -> String {
    match audit_datetime(sec, milli) {
        Some(ts) => {
            let local: DateTime<Local> = ts.with_timezone(&Local);
            local.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
        }
        None => format!("{sec}.{milli:03}"),
    }
}

/// Parse a date-time string from user input into a UTC `DateTime`.
///
/// Accepts several common formats:
/// - `YYYY-MM-DD`
/// - `YYYY-MM-DD HH:MM`
/// - `YYYY-MM-DD HH:MM:SS`
///
/// Input is interpreted as **local time** and converted to UTC.
pub fn parse_datetime_input(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S") {
        return local_naive_to_utc(naive);
    }

    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M") {
        return local_naive_to_utc(naive);
    }

    // Date only means midnight
    if let Ok(date) = chrono::NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        let naive = date.and_hms_opt(0, 0, 0)?;
        return local_naive_to_utc(naive);
    }

    None
}

/// Convert a naive local datetime to UTC.
fn local_naive_to_utc(naive: chrono::NaiveDateTime) -> Option<DateTime<Utc>> {
    let local = Local.from_local_datetime(&naive).earliest()?;
    Some(local.with_timezone(&Utc))
}
