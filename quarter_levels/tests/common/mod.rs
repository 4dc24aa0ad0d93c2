#![allow(dead_code)]

use std::path::PathBuf;

use chrono::{Datelike, Duration, NaiveDate};
use quarter_levels::models::bar::Bar;
use tempfile::TempDir;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn ts(d: NaiveDate) -> i64 {
    d.and_hms_opt(0, 0, 0).expect("midnight").and_utc().timestamp()
}

/// Bar at UTC midnight of `d`.
pub fn bar(d: NaiveDate, open: f64, high: f64, low: f64, close: f64) -> Bar {
    Bar {
        time: ts(d),
        open,
        high,
        low,
        close,
        volume: Some(1_000.0),
    }
}

/// Monday..Friday dates starting at `from`.
pub fn weekdays(from: NaiveDate, n: usize) -> Vec<NaiveDate> {
    let mut out = Vec::with_capacity(n);
    let mut d = from;
    while out.len() < n {
        if d.weekday().num_days_from_monday() < 5 {
            out.push(d);
        }
        d += Duration::days(1);
    }
    out
}

/// Weekday bars closing at `close` with a +/-1 band around it.
pub fn flat_bars(from: NaiveDate, n: usize, close: f64) -> Vec<Bar> {
    weekdays(from, n)
        .into_iter()
        .map(|d| bar(d, close, close + 1.0, close - 1.0, close))
        .collect()
}

/// Weekday bars with the given closes (open = close, +/-0.5 wicks).
pub fn closes_from(from: NaiveDate, closes: &[f64]) -> Vec<Bar> {
    weekdays(from, closes.len())
        .into_iter()
        .zip(closes)
        .map(|(d, &c)| bar(d, c, c + 0.5, c - 0.5, c))
        .collect()
}

pub struct TestDir {
    pub dir: TempDir, // keep alive for the life of the test
}

impl TestDir {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("tempdir"),
        }
    }

    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let p = self.dir.path().join(name);
        std::fs::write(&p, contents).expect("write fixture");
        p
    }
}

pub const PRO_CATALOG: &str = r#"{
    "SPX": {
        "symbol": "SPX",
        "asof": "2024-06-28",
        "daily": {"lines": [
            {"name": "LONG_TRUE_1", "value": -10.0},
            {"name": "LONG_TRUE_2", "value": -5.0},
            {"name": "LONG_TRUE_3", "value": -2.5},
            {"name": "LONG_TRUE_5", "value": 0.0},
            {"name": "LONG_TRUE_7", "value": 2.5, "style": "dashed"},
            {"name": "LONG_TRUE_8", "value": 5.0},
            {"name": "LONG_TRUE_9", "value": 10.0},
            {"name": "LONG_FALSE_1", "value": -8.0},
            {"name": "LONG_FALSE_2", "value": -4.0},
            {"name": "LONG_FALSE_9", "value": 3.0},
            {"name": "SHORT_TRUE_1", "value": -12.0},
            {"name": "SHORT_TRUE_2", "value": -6.0},
            {"name": "SHORT_TRUE_9", "value": 4.0}
        ]},
        "meta": {"source": "desk"}
    },
    "NDX": {
        "asof": "2024-06-28",
        "lines": [
            {"name": "LONG_TRUE_1", "value": -3.0},
            {"name": "LONG_TRUE_2", "value": -1.5},
            {"name": "LONG_TRUE_8", "value": 1.5},
            {"name": "LONG_TRUE_9", "value": 3.0}
        ]
    }
}"#;

pub const SIMPLE_CATALOG: &str = r#"{
    "SPX": {"daily": {"lines": [
        {"name": "Long_High_20", "value": 4.0},
        {"name": "Long_High_50", "value": 2.0},
        {"name": "Long_High_80", "value": 1.0},
        {"name": "Long_Low_20", "value": -4.0},
        {"name": "Long_Low_50", "value": -2.0},
        {"name": "Long_Low_80", "value": -1.0},
        {"name": "Short_High_20", "value": 3.0},
        {"name": "Short_Low_20", "value": -6.0}
    ]}}
}"#;
