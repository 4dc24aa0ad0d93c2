//! Band pairing strategies.
//!
//! A band is a `(low%, high%)` pair drawn as a filled box between two level
//! prices. Two strategies exist and callers pick one per analysis mode:
//! - [`PairingStrategy::FixedIndex`]: index pairs `(1,2) (3,4) (6,7) (8,9)`.
//! - [`PairingStrategy::SymmetricMagnitude`]: `-x%` with `+x%` for every
//!   magnitude present with both signs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{levels::book::LevelBook, models::outcome::OutcomeBucket};

/// Index pairs used by [`PairingStrategy::FixedIndex`], in display order.
pub const FIXED_PAIRS: [(u32, u32); 4] = [(1, 2), (3, 4), (6, 7), (8, 9)];

/// Magnitudes are compared after rounding to this many decimals.
const MAGNITUDE_DECIMALS: i32 = 6;

/// Visual group of a band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandTone {
    /// First two fixed pairs (lower side).
    Purple,
    /// Last two fixed pairs (upper side).
    Blue,
    /// Symmetric bands take the tone of their outcome bucket.
    Bucket(OutcomeBucket),
}

/// A pair of percents forming a band; `low_percent <= high_percent`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Band {
    /// Lower edge in percent.
    pub low_percent: f64,
    /// Upper edge in percent.
    pub high_percent: f64,
    /// Visual group.
    pub tone: BandTone,
}

/// How a bucket's levels are combined into bands.
#[derive(Debug, Clone, PartialEq)]
pub enum PairingStrategy {
    /// Pair the fixed indices of [`FIXED_PAIRS`]; a pair needs both indices.
    FixedIndex,
    /// Pair `+x` with `-x`. Magnitudes in `preferred` come first (in that
    /// order), then the rest ascending.
    SymmetricMagnitude {
        /// Magnitudes to emit first.
        preferred: Vec<f64>,
    },
}

impl PairingStrategy {
    /// Bands for `bucket` of `book`.
    pub fn pair(&self, book: &LevelBook, bucket: OutcomeBucket) -> Vec<Band> {
        match self {
            PairingStrategy::FixedIndex => fixed_index_bands(&book.index_map(bucket)),
            PairingStrategy::SymmetricMagnitude { preferred } => {
                let pcts: Vec<f64> = book.bucket(bucket).iter().map(|l| l.percent).collect();
                symmetric_bands(&pcts, preferred, BandTone::Bucket(bucket))
            }
        }
    }
}

/// Bands from `index -> percent` using [`FIXED_PAIRS`].
pub fn fixed_index_bands(by_index: &BTreeMap<u32, f64>) -> Vec<Band> {
    FIXED_PAIRS
        .iter()
        .enumerate()
        .filter_map(|(i, (a, b))| {
            let (pa, pb) = (by_index.get(a)?, by_index.get(b)?);
            Some(Band {
                low_percent: pa.min(*pb),
                high_percent: pa.max(*pb),
                tone: if i < 2 { BandTone::Purple } else { BandTone::Blue },
            })
        })
        .collect()
}

fn magnitude_key(x: f64) -> i64 {
    (x.abs() * 10f64.powi(MAGNITUDE_DECIMALS)).round() as i64
}

/// Bands pairing `-x` with `+x`. Zero counts as positive and never pairs.
pub fn symmetric_bands(percents: &[f64], preferred: &[f64], tone: BandTone) -> Vec<Band> {
    #[derive(Default)]
    struct Slot {
        pos: Option<f64>,
        neg: Option<f64>,
    }

    let mut by_abs: BTreeMap<i64, Slot> = BTreeMap::new();
    for &p in percents.iter().filter(|p| p.is_finite()) {
        let slot = by_abs.entry(magnitude_key(p)).or_default();
        if p >= 0.0 {
            slot.pos = Some(p);
        } else {
            slot.neg = Some(p);
        }
    }

    let preferred: Vec<i64> = preferred.iter().map(|&x| magnitude_key(x)).collect();
    let order = preferred
        .iter()
        .copied()
        .filter(|k| by_abs.contains_key(k))
        .chain(by_abs.keys().copied().filter(|k| !preferred.contains(k)));

    order
        .filter_map(|k| {
            let slot = by_abs.get(&k)?;
            Some(Band {
                low_percent: slot.neg?,
                high_percent: slot.pos?,
                tone,
            })
        })
        .collect()
}
