//! Quarter range detection.
//!
//! A series is partitioned into UTC calendar quarters. Each quarter that has a
//! Friday bar yields one [`QuarterRange`] anchored on its first Friday; the
//! anchor bar and the bar before it define the range's high and low.

use std::collections::BTreeMap;

use tracing::debug;

use crate::{
    calendar::{SECS_PER_DAY, is_first_day_of_quarter, is_friday, quarter_key},
    models::{
        bar::Bar,
        outcome::Side,
        range::{Confirmation, Failure, QuarterKey, QuarterRange},
    },
};

fn group_by_quarter(bars: &[Bar]) -> BTreeMap<QuarterKey, Vec<usize>> {
    let mut by_quarter: BTreeMap<QuarterKey, Vec<usize>> = BTreeMap::new();
    for (i, b) in bars.iter().enumerate() {
        if let Some(key) = quarter_key(b.time) {
            by_quarter.entry(key).or_default().push(i);
        }
    }
    by_quarter
}

fn first_friday(bars: &[Bar], idxs: &[usize]) -> Option<usize> {
    idxs.iter().copied().find(|&i| is_friday(bars[i].time))
}

/// Bar paired with the anchor to define high/low.
///
/// Normally the bar before the anchor, but never before the quarter's first
/// bar. An anchor on the first calendar day of the quarter reaches back into
/// the previous quarter instead.
fn prior_index(bars: &[Bar], anchor: usize, first_in_quarter: usize) -> usize {
    if anchor > 0 && is_first_day_of_quarter(bars[anchor].time) {
        return anchor - 1;
    }
    anchor.saturating_sub(1).max(first_in_quarter)
}

/// First close outside `[low, high]` after the anchor, then the first close
/// back through the opposite side. Both scans stop at `end_time`.
fn scan_confirmation(
    bars: &[Bar],
    anchor: usize,
    end_time: i64,
    high: f64,
    low: f64,
) -> (Option<Confirmation>, Option<Failure>) {
    let mut confirmation: Option<Confirmation> = None;
    let mut failure: Option<Failure> = None;

    for b in bars[anchor + 1..].iter().take_while(|b| b.time < end_time) {
        match confirmation {
            None => {
                let side = if b.close > high {
                    Some(Side::Long)
                } else if b.close < low {
                    Some(Side::Short)
                } else {
                    None
                };
                confirmation = side.map(|side| Confirmation { side, time: b.time });
            }
            Some(c) => {
                let failed = match c.side {
                    Side::Long => b.close < low,
                    Side::Short => b.close > high,
                };
                if failed {
                    failure = Some(Failure { time: b.time });
                    break;
                }
            }
        }
    }
    (confirmation, failure)
}

/// Partition an ascending bar series into Friday-anchored quarter ranges.
///
/// Quarters without a Friday bar contribute nothing. A range ends at the next
/// quarter's first Friday (or that quarter's first bar when it has none); the
/// last range ends one day after the final bar.
///
/// The input must already be normalized; unsorted input gives unspecified
/// (but memory-safe) results.
pub fn find_quarter_ranges(bars: &[Bar]) -> Vec<QuarterRange> {
    let by_quarter = group_by_quarter(bars);
    let quarters: Vec<(&QuarterKey, &Vec<usize>)> = by_quarter.iter().collect();
    let Some(last_bar) = bars.last() else {
        return Vec::new();
    };

    let mut ranges = Vec::new();
    for (pos, (key, idxs)) in quarters.iter().enumerate() {
        let Some(anchor) = first_friday(bars, idxs) else {
            debug!(quarter = %key, bars = idxs.len(), "no friday bar; quarter skipped");
            continue;
        };
        let prior = prior_index(bars, anchor, idxs[0]);

        let high = bars[prior].high.max(bars[anchor].high);
        let low = bars[prior].low.min(bars[anchor].low);
        let mid = (high + low) / 2.0;

        let end_time = match quarters.get(pos + 1) {
            Some((_, next)) => {
                let next_start = first_friday(bars, next).unwrap_or(next[0]);
                bars[next_start].time
            }
            None => last_bar.time.saturating_add(SECS_PER_DAY),
        };

        let (confirmation, failure) = scan_confirmation(bars, anchor, end_time, high, low);

        ranges.push(QuarterRange {
            key: key.to_string(),
            anchor_index: anchor,
            prior_index: prior,
            start_time: bars[anchor].time,
            end_time,
            high,
            low,
            mid,
            confirmation,
            failure,
        });
    }

    debug!(
        bars = bars.len(),
        quarters = quarters.len(),
        ranges = ranges.len(),
        "detected quarter ranges"
    );
    ranges
}
