//! Daily log returns and their date alignment across two series.

use std::collections::BTreeMap;

use crate::{calendar::day_index, models::bar::Bar};

/// Log return of one bar against the bar before it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyReturn {
    /// Time of the later bar (epoch seconds).
    pub time: i64,
    /// `ln(close / prev_close)`.
    pub value: f64,
}

/// Returns of asset and benchmark on the same calendar day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairedReturn {
    /// Asset bar time (epoch seconds).
    pub time: i64,
    /// Asset log return.
    pub asset: f64,
    /// Benchmark log return.
    pub benchmark: f64,
}

/// Log returns of consecutive closes.
///
/// A pair is skipped when either close is non-positive or non-finite, or the
/// resulting return is not finite.
pub fn log_returns(bars: &[Bar]) -> Vec<DailyReturn> {
    bars.windows(2)
        .filter_map(|w| {
            let (prev, cur) = (w[0].close, w[1].close);
            if !(prev.is_finite() && cur.is_finite() && prev > 0.0 && cur > 0.0) {
                return None;
            }
            let value = (cur / prev).ln();
            value.is_finite().then_some(DailyReturn { time: w[1].time, value })
        })
        .collect()
}

fn by_day(returns: &[DailyReturn]) -> BTreeMap<i64, DailyReturn> {
    // Later returns on the same day replace earlier ones.
    returns.iter().map(|r| (day_index(r.time), *r)).collect()
}

/// Pair returns falling on the same UTC calendar day, ascending by asset time.
pub fn align_returns(asset: &[DailyReturn], benchmark: &[DailyReturn]) -> Vec<PairedReturn> {
    let bench = by_day(benchmark);
    let mut paired: Vec<PairedReturn> = by_day(asset)
        .into_iter()
        .filter_map(|(day, a)| {
            bench.get(&day).map(|b| PairedReturn {
                time: a.time,
                asset: a.value,
                benchmark: b.value,
            })
        })
        .collect();
    paired.sort_by_key(|p| p.time);
    paired
}

/// Aligned log returns of two bar series.
pub fn paired_returns(asset: &[Bar], benchmark: &[Bar]) -> Vec<PairedReturn> {
    align_returns(&log_returns(asset), &log_returns(benchmark))
}
