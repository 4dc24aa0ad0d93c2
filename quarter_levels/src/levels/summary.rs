//! Six-value summary of the latest range's levels.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use crate::{
    levels::{book::LevelBook, price_at, round_to},
    models::{
        level::LevelSide,
        outcome::{OutcomeBucket, Side},
    },
};

/// Fixed-index slot mapping: `(upper20, upper50, upper80, lower20, lower50, lower80)`.
pub const SUMMARY_INDICES: [u32; 6] = [9, 8, 7, 1, 2, 3];

/// Labeled absolute levels, rounded for display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuarterSummary {
    /// Upper 20% level.
    pub upper20: f64,
    /// Upper 50% level.
    pub upper50: f64,
    /// Upper 80% level.
    pub upper80: f64,
    /// Lower 20% level.
    pub lower20: f64,
    /// Lower 50% level.
    pub lower50: f64,
    /// Lower 80% level.
    pub lower80: f64,
}

impl QuarterSummary {
    fn from_percents(mid: f64, pcts: [f64; 6], decimals: u32) -> Self {
        let px = |p: f64| round_to(price_at(mid, p), decimals);
        let [u20, u50, u80, l20, l50, l80] = pcts;
        Self {
            upper20: px(u20),
            upper50: px(u50),
            upper80: px(u80),
            lower20: px(l20),
            lower50: px(l50),
            lower80: px(l80),
        }
    }

    /// Every slot at `mid` (0% offset).
    pub fn at_mid(mid: f64, decimals: u32) -> Self {
        Self::from_percents(mid, [0.0; 6], decimals)
    }

    /// Slots read from indices 9, 8, 7, 1, 2, 3; a missing index is 0%.
    pub fn from_indices(mid: f64, by_index: &BTreeMap<u32, f64>, decimals: u32) -> Self {
        let pcts = SUMMARY_INDICES.map(|i| by_index.get(&i).copied().unwrap_or(0.0));
        Self::from_percents(mid, pcts, decimals)
    }

    /// Slots read from simple-catalog names (`{Long|Short}_{High|Low}_{20|50|80}`)
    /// of the given side; a missing name is 0%.
    pub fn from_simple_names(mid: f64, book: &LevelBook, side: Side, decimals: u32) -> Self {
        let bucket = match side {
            Side::Long => OutcomeBucket::LongConfirmed,
            Side::Short => OutcomeBucket::ShortConfirmed,
        };
        let pct = |s: LevelSide, i: u32| book.find(bucket, s, i).unwrap_or(0.0);
        let pcts = [
            pct(LevelSide::High, 20),
            pct(LevelSide::High, 50),
            pct(LevelSide::High, 80),
            pct(LevelSide::Low, 20),
            pct(LevelSide::Low, 50),
            pct(LevelSide::Low, 80),
        ];
        Self::from_percents(mid, pcts, decimals)
    }
}

impl fmt::Display for QuarterSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "upper 20%: {:.2}", self.upper20)?;
        writeln!(f, "upper 50%: {:.2}", self.upper50)?;
        writeln!(f, "upper 80%: {:.2}", self.upper80)?;
        writeln!(f, "lower 20%: {:.2}", self.lower20)?;
        writeln!(f, "lower 50%: {:.2}", self.lower50)?;
        write!(f, "lower 80%: {:.2}", self.lower80)
    }
}
