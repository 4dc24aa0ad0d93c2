//! Bar normalization: raw rows in, canonical ascending series out.
//!
//! What normalization does:
//! - Drops rows whose open/high/low/close are not finite after coercion, or
//!   whose time cannot be read
//! - Converts every time to whole UTC seconds (epoch values above
//!   `10_000_000_000` are milliseconds)
//! - Sorts ascending by time (stable, so input order breaks ties)
//! - Merges rows sharing a second: first open, last close, max high, min low,
//!   summed volume
//!
//! Malformed rows are never an error. The counts of what was dropped or merged
//! are available through [`normalize_bars_with_report`].

use tracing::debug;

use crate::{
    calendar::{epoch_to_secs, parse_text_secs},
    models::bar::{Bar, RawBar, RawNumber, RawTime},
};

/// Summary of changes performed during normalization.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NormalizationReport {
    /// Rows received.
    pub rows_in: usize,
    /// Rows dropped for non-finite prices or an unreadable time.
    pub rows_dropped: usize,
    /// Rows folded into an earlier row with the same timestamp.
    pub rows_merged: usize,
}

fn time_secs(t: &RawTime) -> Option<i64> {
    match t {
        RawTime::Epoch(v) => epoch_to_secs(*v),
        RawTime::Instant(dt) => Some(dt.timestamp()),
        RawTime::Text(s) => parse_text_secs(s),
    }
}

fn coerce(v: &Option<RawNumber>) -> Option<f64> {
    v.as_ref().and_then(RawNumber::to_finite)
}

fn coerce_row(row: &RawBar) -> Option<Bar> {
    Some(Bar {
        time: time_secs(&row.time)?,
        open: coerce(&row.open)?,
        high: coerce(&row.high)?,
        low: coerce(&row.low)?,
        close: coerce(&row.close)?,
        volume: coerce(&row.volume),
    })
}

fn merge_into(acc: &mut Bar, b: &Bar) {
    acc.close = b.close;
    acc.high = acc.high.max(b.high);
    acc.low = acc.low.min(b.low);
    acc.volume = match (acc.volume, b.volume) {
        (None, None) => None,
        (a, b) => Some(a.unwrap_or(0.0) + b.unwrap_or(0.0)),
    };
}

/// Normalize raw rows, returning the series and a [`NormalizationReport`].
pub fn normalize_bars_with_report(raw: &[RawBar]) -> (Vec<Bar>, NormalizationReport) {
    let mut report = NormalizationReport {
        rows_in: raw.len(),
        ..Default::default()
    };

    let mut rows: Vec<Bar> = raw.iter().filter_map(coerce_row).collect();
    report.rows_dropped = raw.len() - rows.len();
    rows.sort_by_key(|b| b.time);

    let mut out: Vec<Bar> = Vec::with_capacity(rows.len());
    for b in rows {
        match out.last_mut() {
            Some(last) if last.time == b.time => {
                merge_into(last, &b);
                report.rows_merged += 1;
            }
            _ => out.push(b),
        }
    }

    debug!(
        rows_in = report.rows_in,
        dropped = report.rows_dropped,
        merged = report.rows_merged,
        bars = out.len(),
        "normalized bar series"
    );
    (out, report)
}

/// Normalize raw rows into an ascending, de-duplicated bar series.
///
/// See the module docs for the exact rules. Empty input yields an empty series.
pub fn normalize_bars(raw: &[RawBar]) -> Vec<Bar> {
    normalize_bars_with_report(raw).0
}

/// Parse a JSON array of raw rows and normalize it.
///
/// A document that is not an array yields an empty series; rows that do not
/// fit the row shape at all (e.g., no `time`) are dropped like any other
/// malformed row.
pub fn normalize_json(json: &str) -> crate::Result<Vec<Bar>> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let serde_json::Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    let rows: Vec<RawBar> = items
        .into_iter()
        .filter_map(|v| serde_json::from_value(v).ok())
        .collect();
    Ok(normalize_bars(&rows))
}
