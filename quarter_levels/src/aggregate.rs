//! Weekly aggregation of a daily series in a local time zone.
//!
//! Weeks start Monday 00:00 local time in the given IANA zone (DST aware via
//! chrono-tz). A bucket keeps the first open, max high, min low, last close
//! and summed volume, with missing volume counted as zero. The aggregated
//! bar's `time` is the bucket start in UTC seconds.

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::{Error, Result, models::bar::Bar};

/// Zone used when the caller has no preference.
pub const DEFAULT_WEEK_TZ: &str = "America/New_York";

/// Parse an IANA zone name.
pub fn parse_tz(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| Error::Config(format!("unknown time zone: {name}")))
}

/// Local midnight to UTC. Ambiguous midnights pick the earlier instant, and a
/// midnight inside a spring-forward gap moves to the first valid minute.
fn local_midnight_utc(naive: NaiveDateTime, tz: Tz) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Some(dt.with_timezone(&Utc)),
        LocalResult::None => (1..=120).find_map(|m| {
            tz.from_local_datetime(&(naive + Duration::minutes(m)))
                .earliest()
                .map(|dt| dt.with_timezone(&Utc))
        }),
    }
}

/// Start of the Monday-based week containing `ts`, as UTC seconds.
pub fn week_start(ts: i64, tz: Tz) -> Option<i64> {
    let local = DateTime::from_timestamp(ts, 0)?.with_timezone(&tz);
    let monday = local.date_naive() - Duration::days(i64::from(local.weekday().num_days_from_monday()));
    local_midnight_utc(monday.and_hms_opt(0, 0, 0)?, tz).map(|dt| dt.timestamp())
}

/// Aggregate an ascending daily series into weekly bars in zone `tz_name`.
///
/// # Errors
/// [`Error::Config`] if `tz_name` is not a known IANA zone.
pub fn to_weekly(bars: &[Bar], tz_name: &str) -> Result<Vec<Bar>> {
    let tz = parse_tz(tz_name)?;
    let mut out: Vec<Bar> = Vec::new();

    for b in bars {
        let Some(key) = week_start(b.time, tz) else {
            continue;
        };
        match out.last_mut() {
            Some(cur) if cur.time == key => {
                cur.high = cur.high.max(b.high);
                cur.low = cur.low.min(b.low);
                cur.close = b.close;
                cur.volume = Some(cur.volume.unwrap_or(0.0) + b.volume.unwrap_or(0.0));
            }
            _ => out.push(Bar {
                time: key,
                volume: Some(b.volume.unwrap_or(0.0)),
                ..*b
            }),
        }
    }
    Ok(out)
}
