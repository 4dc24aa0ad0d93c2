//! Level mapping: percentage definitions onto a range's mid price.
//!
//! - [`book`] parses and groups definitions by outcome bucket.
//! - [`pairing`] turns a bucket into bands.
//! - [`summary`] renders the six labeled levels of the latest range.
//! - [`window`] computes the time span levels are drawn over.
//!
//! Prices are kept at full precision here; only [`summary`] rounds.

pub mod book;
pub mod pairing;
pub mod summary;
pub mod window;

use serde::{Deserialize, Serialize};

use crate::models::{level::LineStyle, outcome::OutcomeBucket, range::QuarterRange};

pub use book::LevelBook;
pub use pairing::{Band, BandTone, PairingStrategy};
pub use summary::QuarterSummary;
pub use window::DisplayWindow;

/// Absolute price of a `pct` offset from `mid`.
pub fn price_at(mid: f64, pct: f64) -> f64 {
    mid * (1.0 + pct / 100.0)
}

/// Round half away from zero to `decimals` places.
pub fn round_to(x: f64, decimals: u32) -> f64 {
    let f = 10f64.powi(decimals as i32);
    (x * f).round() / f
}

/// One level drawn as a horizontal line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelLine {
    /// Definition name.
    pub name: String,
    /// Offset from mid in percent.
    pub percent: f64,
    /// Absolute price.
    pub price: f64,
    /// Stroke style.
    pub line_style: LineStyle,
    /// CSS color.
    pub color: String,
}

/// A band with both edges converted to prices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBand {
    /// Percent pair and tone.
    #[serde(flatten)]
    pub band: Band,
    /// Price of the lower edge.
    pub low_price: f64,
    /// Price of the upper edge.
    pub high_price: f64,
}

/// Levels of one range under one outcome bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeLevels {
    /// Bucket the levels were read from; `None` means mid-only output.
    pub bucket: Option<OutcomeBucket>,
    /// Percent of the mid/reference line.
    pub mid_percent: f64,
    /// Price of the mid/reference line.
    pub mid_price: f64,
    /// Bands from the pairing strategy.
    pub bands: Vec<PriceBand>,
    /// Every level of the bucket as an individual line.
    pub lines: Vec<LevelLine>,
    /// Span the levels are drawn over, if non-empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<DisplayWindow>,
}

/// Map the levels of `bucket` onto `range`.
///
/// With no bucket (an unresolved `NONE` outcome) or an empty bucket, the
/// result is the range's own mid with no bands or lines.
pub fn map_range_levels(
    range: &QuarterRange,
    book: &LevelBook,
    bucket: Option<OutcomeBucket>,
    strategy: &PairingStrategy,
) -> RangeLevels {
    let mid = range.mid;
    let (mid_percent, bands, lines) = match bucket {
        Some(b) => {
            let bands = strategy
                .pair(book, b)
                .into_iter()
                .map(|band| PriceBand {
                    band,
                    low_price: price_at(mid, band.low_percent),
                    high_price: price_at(mid, band.high_percent),
                })
                .collect();
            let lines = book
                .bucket(b)
                .iter()
                .map(|l| LevelLine {
                    name: l.name.clone(),
                    percent: l.percent,
                    price: price_at(mid, l.percent),
                    line_style: l.line_style.clone(),
                    color: l.color.clone(),
                })
                .collect();
            (book.mid_percent(b), bands, lines)
        }
        None => (0.0, Vec::new(), Vec::new()),
    };

    RangeLevels {
        bucket,
        mid_percent,
        mid_price: price_at(mid, mid_percent),
        bands,
        lines,
        window: window::display_window(range),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::level::LevelDefinition;

    fn range(mid: f64) -> QuarterRange {
        QuarterRange {
            key: "2024-Q2".into(),
            anchor_index: 3,
            prior_index: 2,
            start_time: 0,
            end_time: 90 * 86_400,
            high: mid + 10.0,
            low: mid - 10.0,
            mid,
            confirmation: None,
            failure: None,
        }
    }

    #[test]
    fn rounding() {
        assert_eq!(round_to(1.005_000_1, 2), 1.01);
        assert_eq!(round_to(-2.345_678_9, 4), -2.3457);
        assert_eq!(round_to(7.0, 0), 7.0);
    }

    #[test]
    fn maps_fixed_bands_and_mid() {
        let book = LevelBook::from_definitions(&[
            LevelDefinition::new("SHORT_TRUE_1", -6.0),
            LevelDefinition::new("SHORT_TRUE_2", -4.0),
            LevelDefinition::new("SHORT_TRUE_5", -1.0),
        ]);
        let levels = map_range_levels(
            &range(200.0),
            &book,
            Some(OutcomeBucket::ShortConfirmed),
            &PairingStrategy::FixedIndex,
        );
        assert_eq!(levels.mid_percent, -1.0);
        assert_eq!(round_to(levels.mid_price, 9), 198.0);
        assert_eq!(levels.bands.len(), 1);
        assert_eq!(round_to(levels.bands[0].low_price, 9), 188.0);
        assert_eq!(round_to(levels.bands[0].high_price, 9), 192.0);
        assert_eq!(levels.lines.len(), 3);
        assert!(levels.window.is_some());
    }

    #[test]
    fn no_bucket_is_mid_only() {
        let book = LevelBook::from_definitions(&[LevelDefinition::new("LONG_TRUE_5", 1.0)]);
        let levels = map_range_levels(&range(50.0), &book, None, &PairingStrategy::FixedIndex);
        assert_eq!(levels.mid_price, 50.0);
        assert!(levels.bands.is_empty() && levels.lines.is_empty());

        let empty = map_range_levels(
            &range(50.0),
            &book,
            Some(OutcomeBucket::ShortFailed),
            &PairingStrategy::FixedIndex,
        );
        assert_eq!(empty.mid_price, 50.0);
        assert!(empty.bands.is_empty());
    }
}
