//! UTC calendar helpers over epoch-second timestamps.
//!
//! - One stable epoch: Unix (1970-01-01T00:00:00Z).
//! - Days are fixed 86 400-second buckets; `day_index` is second-based math.
//! - Quarters are calendar-aware: Q1 = Jan..Mar, ..., Q4 = Oct..Dec.
//!
//! All functions assume the input timestamp is UTC.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc, Weekday};

use crate::models::range::QuarterKey;

/// Number of seconds in a day.
pub const SECS_PER_DAY: i64 = 24 * 60 * 60;

/// Epoch values above this are milliseconds, not seconds.
pub const MILLIS_THRESHOLD: f64 = 10_000_000_000.0;

fn utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

/// Calendar quarter containing `ts`, `None` if out of chrono's range.
pub fn quarter_key(ts: i64) -> Option<QuarterKey> {
    let d = utc(ts)?;
    Some(QuarterKey {
        year: d.year(),
        quarter: d.month0() / 3 + 1,
    })
}

/// True if `ts` falls on a Friday (UTC).
pub fn is_friday(ts: i64) -> bool {
    utc(ts).is_some_and(|d| d.weekday() == Weekday::Fri)
}

/// True if `ts` is on Jan 1, Apr 1, Jul 1 or Oct 1 (UTC).
pub fn is_first_day_of_quarter(ts: i64) -> bool {
    utc(ts).is_some_and(|d| d.day() == 1 && d.month0() % 3 == 0)
}

/// Linear calendar-day index since the epoch; equal for any two instants on the same UTC date.
pub fn day_index(ts: i64) -> i64 {
    ts.div_euclid(SECS_PER_DAY)
}

/// Epoch number (seconds or milliseconds) to whole seconds, flooring.
///
/// `None` for non-finite input or an instant outside chrono's calendar range.
pub fn epoch_to_secs(v: f64) -> Option<i64> {
    if !v.is_finite() {
        return None;
    }
    let secs = if v > MILLIS_THRESHOLD { v / 1000.0 } else { v };
    let secs = secs.floor() as i64;
    utc(secs).map(|_| secs)
}

/// Parse a textual timestamp into whole UTC seconds.
///
/// Accepts RFC-3339 with an offset, `YYYY-MM-DD` (midnight UTC), and naive
/// `YYYY-MM-DD[T ]HH:MM:SS[.fff]` which is read as UTC.
pub fn parse_text_secs(s: &str) -> Option<i64> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc().timestamp());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().timestamp())
}
