//! Time span over which a range's levels are drawn.

use serde::{Deserialize, Serialize};

use crate::{calendar::SECS_PER_DAY, models::bar::Bar, models::range::QuarterRange};

/// Inclusive time span `[start, end]` in epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayWindow {
    /// First drawn time.
    pub start: i64,
    /// Last drawn time.
    pub end: i64,
}

/// `[start_time + 1 day, end_time - 1 day]`, or `None` when that is empty.
pub fn display_window(range: &QuarterRange) -> Option<DisplayWindow> {
    let start = range.start_time.saturating_add(SECS_PER_DAY);
    let end = range.end_time.saturating_sub(SECS_PER_DAY);
    (start < end).then_some(DisplayWindow { start, end })
}

/// Snap a window onto actual bar times.
///
/// The start moves to the first bar at or after it, the end to the last bar
/// at or before it. A span of one bar or less is widened one bar backward.
/// `None` only when `bars` is empty.
pub fn snap_window_to_bars(window: DisplayWindow, bars: &[Bar]) -> Option<DisplayWindow> {
    let last = bars.len().checked_sub(1)?;
    let mut i1 = bars.partition_point(|b| b.time < window.start);
    let mut i2 = bars.partition_point(|b| b.time <= window.end).saturating_sub(1);
    if i1 >= i2 {
        i1 = i1.saturating_sub(1);
        i2 = i2.max(i1);
    }
    Some(DisplayWindow {
        start: bars[i1.min(last)].time,
        end: bars[i2.min(last)].time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bars_at(times: &[i64]) -> Vec<Bar> {
        times
            .iter()
            .map(|&t| Bar {
                time: t,
                open: 1.0,
                high: 1.0,
                low: 1.0,
                close: 1.0,
                volume: None,
            })
            .collect()
    }

    #[test]
    fn window_trims_a_day_each_side() {
        let r = QuarterRange {
            key: "2024-Q1".into(),
            anchor_index: 0,
            prior_index: 0,
            start_time: 0,
            end_time: 10 * SECS_PER_DAY,
            high: 1.0,
            low: 1.0,
            mid: 1.0,
            confirmation: None,
            failure: None,
        };
        assert_eq!(
            display_window(&r),
            Some(DisplayWindow { start: SECS_PER_DAY, end: 9 * SECS_PER_DAY })
        );
        let extreme = QuarterRange { start_time: i64::MAX - 1, end_time: i64::MIN + 1, ..r.clone() };
        assert_eq!(display_window(&extreme), None);
        let short = QuarterRange { end_time: 2 * SECS_PER_DAY, ..r };
        assert_eq!(display_window(&short), None);
    }

    #[test]
    fn snaps_inward_to_bar_times() {
        let bars = bars_at(&[10, 20, 30, 40, 50]);
        let w = snap_window_to_bars(DisplayWindow { start: 15, end: 45 }, &bars).unwrap();
        assert_eq!(w, DisplayWindow { start: 20, end: 40 });
    }

    #[test]
    fn one_bar_span_widens_backward() {
        let bars = bars_at(&[10, 20, 30]);
        let w = snap_window_to_bars(DisplayWindow { start: 25, end: 35 }, &bars).unwrap();
        assert_eq!(w, DisplayWindow { start: 20, end: 30 });
        assert_eq!(snap_window_to_bars(w, &[]), None);
    }
}
