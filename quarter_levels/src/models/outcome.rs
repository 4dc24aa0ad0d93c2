//! Outcome keys: how price resolved against a quarter range.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Direction of a confirmed move out of a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    /// Close above the range high.
    Long,
    /// Close below the range low.
    Short,
}

/// Classification of a single quarter range.
///
/// `Auto` is a request-side value only ("classify it for me"); the classifier
/// never returns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeKey {
    /// Resolve by classification.
    #[default]
    Auto,
    /// Breakout above the high that held.
    LongConfirmed,
    /// Breakout above the high, later closed back below the low.
    LongFailed,
    /// Breakdown below the low that held.
    ShortConfirmed,
    /// Breakdown below the low, later closed back above the high.
    ShortFailed,
    /// Price never closed outside the range.
    None,
}

impl OutcomeKey {
    /// Level bucket holding the definitions for this outcome (`None` for `Auto`/`None`).
    pub fn bucket(self) -> Option<OutcomeBucket> {
        match self {
            OutcomeKey::LongConfirmed => Some(OutcomeBucket::LongConfirmed),
            OutcomeKey::LongFailed => Some(OutcomeBucket::LongFailed),
            OutcomeKey::ShortConfirmed => Some(OutcomeBucket::ShortConfirmed),
            OutcomeKey::ShortFailed => Some(OutcomeBucket::ShortFailed),
            OutcomeKey::Auto | OutcomeKey::None => None,
        }
    }

    /// Side of the confirmation behind this outcome, if any.
    pub fn side(self) -> Option<Side> {
        self.bucket().map(OutcomeBucket::side)
    }

    /// Canonical upper snake-case name (e.g., `LONG_FAILED`).
    pub const fn as_str(self) -> &'static str {
        match self {
            OutcomeKey::Auto => "AUTO",
            OutcomeKey::LongConfirmed => "LONG_CONFIRMED",
            OutcomeKey::LongFailed => "LONG_FAILED",
            OutcomeKey::ShortConfirmed => "SHORT_CONFIRMED",
            OutcomeKey::ShortFailed => "SHORT_FAILED",
            OutcomeKey::None => "NONE",
        }
    }
}

impl fmt::Display for OutcomeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutcomeKey {
    type Err = String;

    /// Accepts `LONG_CONFIRMED`, `long-confirmed`, and the catalog spellings
    /// `LONG_TRUE` / `LONG_FALSE`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_uppercase().replace('-', "_");
        match key.as_str() {
            "AUTO" => Ok(OutcomeKey::Auto),
            "LONG_CONFIRMED" | "LONG_TRUE" => Ok(OutcomeKey::LongConfirmed),
            "LONG_FAILED" | "LONG_FALSE" => Ok(OutcomeKey::LongFailed),
            "SHORT_CONFIRMED" | "SHORT_TRUE" => Ok(OutcomeKey::ShortConfirmed),
            "SHORT_FAILED" | "SHORT_FALSE" => Ok(OutcomeKey::ShortFailed),
            "NONE" => Ok(OutcomeKey::None),
            _ => Err(format!("unknown outcome: {s}")),
        }
    }
}

/// One of the four outcome groups a level definition can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeBucket {
    /// Levels drawn after a held breakout.
    LongConfirmed,
    /// Levels drawn after a failed breakout.
    LongFailed,
    /// Levels drawn after a held breakdown.
    ShortConfirmed,
    /// Levels drawn after a failed breakdown.
    ShortFailed,
}

impl OutcomeBucket {
    /// All buckets in display order.
    pub const ALL: [OutcomeBucket; 4] = [
        OutcomeBucket::LongConfirmed,
        OutcomeBucket::LongFailed,
        OutcomeBucket::ShortConfirmed,
        OutcomeBucket::ShortFailed,
    ];

    /// Side of the confirmation this bucket follows.
    pub const fn side(self) -> Side {
        match self {
            OutcomeBucket::LongConfirmed | OutcomeBucket::LongFailed => Side::Long,
            OutcomeBucket::ShortConfirmed | OutcomeBucket::ShortFailed => Side::Short,
        }
    }

    /// The outcome key this bucket serves.
    pub const fn outcome(self) -> OutcomeKey {
        match self {
            OutcomeBucket::LongConfirmed => OutcomeKey::LongConfirmed,
            OutcomeBucket::LongFailed => OutcomeKey::LongFailed,
            OutcomeBucket::ShortConfirmed => OutcomeKey::ShortConfirmed,
            OutcomeBucket::ShortFailed => OutcomeKey::ShortFailed,
        }
    }
}
