//! Quarter ranges: the unit of analysis, one per calendar quarter that has a Friday bar.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::outcome::Side;

/// Calendar quarter in UTC. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QuarterKey {
    /// Calendar year.
    pub year: i32,
    /// Quarter number, 1..=4.
    pub quarter: u32,
}

impl fmt::Display for QuarterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-Q{}", self.year, self.quarter)
    }
}

/// First close outside the range after the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Confirmation {
    /// Which boundary was crossed.
    pub side: Side,
    /// Time of the confirming bar (epoch seconds).
    pub time: i64,
}

/// First close back through the opposite boundary after a confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    /// Time of the failing bar (epoch seconds).
    pub time: i64,
}

/// A Friday-anchored quarter range with its defining high/low/mid.
///
/// Invariants: `start_time < end_time` and `mid == (high + low) / 2`.
/// Ranges from one series are chronological and, when consecutive quarters
/// both have a Friday, contiguous (`end_time` of one is `start_time` of the next).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuarterRange {
    /// Quarter label, e.g. `2024-Q1`.
    pub key: String,
    /// Index of the anchor (first Friday) bar.
    pub anchor_index: usize,
    /// Index of the bar paired with the anchor to define high/low.
    pub prior_index: usize,
    /// Anchor bar time (epoch seconds).
    pub start_time: i64,
    /// Next range's anchor time, or last bar + 1 day (exclusive).
    pub end_time: i64,
    /// Max of the prior and anchor highs.
    pub high: f64,
    /// Min of the prior and anchor lows.
    pub low: f64,
    /// Midpoint of `high` and `low`; base of every percentage level.
    pub mid: f64,
    /// First close beyond the range after the anchor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation: Option<Confirmation>,
    /// First close back through the opposite side after the confirmation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<Failure>,
}

impl QuarterRange {
    /// True if `time` falls in `[start_time, end_time)`.
    pub fn contains(&self, time: i64) -> bool {
        self.start_time <= time && time < self.end_time
    }
}
