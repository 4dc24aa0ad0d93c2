//! Level definitions parsed once and grouped by outcome bucket.

use std::collections::BTreeMap;

use tracing::warn;

use crate::models::{
    level::{LevelDefinition, LevelSide, LineStyle, ParsedName},
    outcome::{OutcomeBucket, Side},
};

/// Line color when a LONG-bucket definition carries none.
pub const DEFAULT_LONG_COLOR: &str = "#2563eb";
/// Line color when a SHORT-bucket definition carries none.
pub const DEFAULT_SHORT_COLOR: &str = "#dc2626";

/// Default color for a bucket's lines.
pub const fn default_color(bucket: OutcomeBucket) -> &'static str {
    match bucket.side() {
        Side::Long => DEFAULT_LONG_COLOR,
        Side::Short => DEFAULT_SHORT_COLOR,
    }
}

/// One usable level: a definition whose name parsed and whose percent is numeric.
#[derive(Debug, Clone, PartialEq)]
pub struct BookLevel {
    /// Name as written in the catalog.
    pub name: String,
    /// Parsed name.
    pub parsed: ParsedName,
    /// Offset from mid in percent.
    pub percent: f64,
    /// Line style (solid when unspecified).
    pub line_style: LineStyle,
    /// Line color, defaulted per side when unspecified.
    pub color: String,
}

/// Level definitions grouped by [`OutcomeBucket`], each bucket sorted by percent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelBook {
    buckets: BTreeMap<OutcomeBucket, Vec<BookLevel>>,
    skipped: usize,
}

impl LevelBook {
    /// Build a book from catalog definitions.
    ///
    /// Definitions whose name has no outcome prefix, or whose percent is not
    /// numeric, are skipped and counted.
    pub fn from_definitions(defs: &[LevelDefinition]) -> Self {
        let mut book = LevelBook::default();
        for def in defs {
            let (Some(parsed), Some(percent)) = (ParsedName::parse(&def.name), def.percent.value())
            else {
                book.skipped += 1;
                continue;
            };
            book.buckets.entry(parsed.bucket).or_default().push(BookLevel {
                name: def.name.clone(),
                parsed,
                percent,
                line_style: def.line_style.clone().unwrap_or_default(),
                color: def
                    .color
                    .clone()
                    .unwrap_or_else(|| default_color(parsed.bucket).to_string()),
            });
        }
        for levels in book.buckets.values_mut() {
            levels.sort_by(|a, b| a.percent.total_cmp(&b.percent));
        }
        if book.skipped > 0 {
            warn!(skipped = book.skipped, "level definitions without outcome prefix or numeric percent");
        }
        book
    }

    /// Levels of `bucket`, ascending by percent. Empty if none.
    pub fn bucket(&self, bucket: OutcomeBucket) -> &[BookLevel] {
        self.buckets.get(&bucket).map(Vec::as_slice).unwrap_or(&[])
    }

    /// True if `bucket` has at least one level.
    pub fn has(&self, bucket: OutcomeBucket) -> bool {
        !self.bucket(bucket).is_empty()
    }

    /// True if no bucket has any level.
    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(Vec::is_empty)
    }

    /// Number of definitions that could not be used.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// `index -> percent` for the levels of `bucket` that carry a numeric index.
    ///
    /// When two levels share an index the one with the larger percent wins.
    pub fn index_map(&self, bucket: OutcomeBucket) -> BTreeMap<u32, f64> {
        self.bucket(bucket)
            .iter()
            .filter_map(|l| l.parsed.index.map(|i| (i, l.percent)))
            .collect()
    }

    /// Percent of the mid/reference line of `bucket`.
    ///
    /// Index 5 if present, else the level closest to zero, else `0.0`.
    pub fn mid_percent(&self, bucket: OutcomeBucket) -> f64 {
        let by_index = self.index_map(bucket);
        if let Some(p) = by_index.get(&5) {
            return *p;
        }
        by_index
            .values()
            .copied()
            .min_by(|a, b| a.abs().total_cmp(&b.abs()))
            .unwrap_or(0.0)
    }

    /// Percent of the first level of `bucket` with the given side and index.
    pub fn find(&self, bucket: OutcomeBucket, side: LevelSide, index: u32) -> Option<f64> {
        self.bucket(bucket)
            .iter()
            .find(|l| l.parsed.side == Some(side) && l.parsed.index == Some(index))
            .map(|l| l.percent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::level::Percent;

    fn defs(items: &[(&str, f64)]) -> Vec<LevelDefinition> {
        items.iter().map(|(n, p)| LevelDefinition::new(*n, *p)).collect()
    }

    #[test]
    fn groups_and_sorts_by_percent() {
        let book = LevelBook::from_definitions(&defs(&[
            ("LONG_TRUE_9", 8.0),
            ("LONG_TRUE_1", -8.0),
            ("SHORT_FALSE_5", 0.5),
            ("LONG_TRUE_5", 1.0),
        ]));
        let pcts: Vec<f64> = book
            .bucket(OutcomeBucket::LongConfirmed)
            .iter()
            .map(|l| l.percent)
            .collect();
        assert_eq!(pcts, vec![-8.0, 1.0, 8.0]);
        assert!(book.has(OutcomeBucket::ShortFailed));
        assert!(!book.has(OutcomeBucket::LongFailed));
    }

    #[test]
    fn skips_unusable_definitions() {
        let mut d = defs(&[("MID_5", 1.0), ("LONG_TRUE_2", 3.0)]);
        d.push(LevelDefinition {
            percent: Percent::Text("n/a".into()),
            ..LevelDefinition::new("LONG_TRUE_3", 0.0)
        });
        let book = LevelBook::from_definitions(&d);
        assert_eq!(book.skipped(), 2);
        assert_eq!(book.bucket(OutcomeBucket::LongConfirmed).len(), 1);
    }

    #[test]
    fn mid_prefers_index_five_then_closest_to_zero() {
        let b = OutcomeBucket::LongConfirmed;
        let book = LevelBook::from_definitions(&defs(&[("LONG_TRUE_5", 2.0), ("LONG_TRUE_4", 0.1)]));
        assert_eq!(book.mid_percent(b), 2.0);

        let book = LevelBook::from_definitions(&defs(&[("LONG_TRUE_4", -0.3), ("LONG_TRUE_6", 0.7)]));
        assert_eq!(book.mid_percent(b), -0.3);

        assert_eq!(LevelBook::default().mid_percent(b), 0.0);
    }

    #[test]
    fn default_colors_follow_side() {
        let book = LevelBook::from_definitions(&defs(&[("Long_High_20", 1.0), ("SHORT_TRUE_1", -1.0)]));
        assert_eq!(book.bucket(OutcomeBucket::LongConfirmed)[0].color, DEFAULT_LONG_COLOR);
        assert_eq!(book.bucket(OutcomeBucket::ShortConfirmed)[0].color, DEFAULT_SHORT_COLOR);
        assert_eq!(
            book.find(OutcomeBucket::LongConfirmed, LevelSide::High, 20),
            Some(1.0)
        );
    }
}
