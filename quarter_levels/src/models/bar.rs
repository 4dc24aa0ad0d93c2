//! Canonical in-memory representation of a daily bar (OHLCV) and the loose
//! row shape it is normalized from.
//!
//! [`Bar`] is what every downstream stage consumes. [`RawBar`] mirrors the
//! heterogeneous records handed over by bar sources: time as seconds,
//! milliseconds or a date string, prices as numbers or numeric strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single bar for a given UTC timestamp.
///
/// Within a normalized series `time` is strictly increasing. The usual
/// `high >= max(open, close) >= min(open, close) >= low` ordering is assumed
/// but never validated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Seconds since the Unix epoch (UTC).
    pub time: i64,
    /// Opening price.
    pub open: f64,
    /// Highest price during the bar interval.
    pub high: f64,
    /// Lowest price during the bar interval.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Volume traded during the bar interval. Not all sources supply this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

impl Bar {
    /// Bar timestamp as a UTC datetime, `None` if out of chrono's range.
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.time, 0)
    }
}

/// Time field of a raw row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTime {
    /// Epoch seconds, or epoch milliseconds when above `10_000_000_000`.
    Epoch(f64),
    /// RFC-3339 instant.
    Instant(DateTime<Utc>),
    /// Any other textual date (`YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS`, ...).
    Text(String),
}

/// A numeric field of a raw row: a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    /// Plain number.
    Number(f64),
    /// Number carried as text (e.g., "4521.25").
    Text(String),
}

impl RawNumber {
    /// Numeric coercion; `None` unless the result is finite.
    pub fn to_finite(&self) -> Option<f64> {
        let v = match self {
            RawNumber::Number(v) => *v,
            RawNumber::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        v.is_finite().then_some(v)
    }
}

impl From<f64> for RawNumber {
    fn from(v: f64) -> Self {
        RawNumber::Number(v)
    }
}

/// One unvalidated bar record as received from a bar source.
///
/// Any field may be missing or malformed; [`crate::normalize::normalize_bars`]
/// drops rows it cannot coerce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    /// Timestamp in any supported representation.
    pub time: RawTime,
    /// Opening price.
    #[serde(default)]
    pub open: Option<RawNumber>,
    /// Highest price.
    #[serde(default)]
    pub high: Option<RawNumber>,
    /// Lowest price.
    #[serde(default)]
    pub low: Option<RawNumber>,
    /// Closing price.
    #[serde(default)]
    pub close: Option<RawNumber>,
    /// Optional volume.
    #[serde(default)]
    pub volume: Option<RawNumber>,
}

impl From<&Bar> for RawBar {
    fn from(b: &Bar) -> Self {
        RawBar {
            time: RawTime::Epoch(b.time as f64),
            open: Some(b.open.into()),
            high: Some(b.high.into()),
            low: Some(b.low.into()),
            close: Some(b.close.into()),
            volume: b.volume.map(RawNumber::from),
        }
    }
}
