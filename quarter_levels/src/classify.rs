//! Outcome classification of a quarter range.

use crate::models::{bar::Bar, outcome::OutcomeKey, range::QuarterRange};

/// Classify how price resolved against `range` over `[start_time, end_time)`.
///
/// The first close strictly above `high` confirms long; otherwise the first
/// close strictly below `low` confirms short. After a confirmation, the first
/// close through the opposite boundary turns it into a failure and ends the
/// scan. No confirmation means [`OutcomeKey::None`]. Never returns `Auto`.
pub fn classify(range: &QuarterRange, bars: &[Bar]) -> OutcomeKey {
    let mut confirmed: Option<OutcomeKey> = None;

    for b in bars.iter().filter(|b| range.contains(b.time)) {
        match confirmed {
            None if b.close > range.high => confirmed = Some(OutcomeKey::LongConfirmed),
            None if b.close < range.low => confirmed = Some(OutcomeKey::ShortConfirmed),
            None => {}
            Some(OutcomeKey::LongConfirmed) if b.close < range.low => return OutcomeKey::LongFailed,
            Some(OutcomeKey::ShortConfirmed) if b.close > range.high => {
                return OutcomeKey::ShortFailed;
            }
            Some(_) => {}
        }
    }
    confirmed.unwrap_or(OutcomeKey::None)
}

/// Classify every range of a series, in order.
pub fn classify_all(ranges: &[QuarterRange], bars: &[Bar]) -> Vec<OutcomeKey> {
    ranges.iter().map(|r| classify(r, bars)).collect()
}
