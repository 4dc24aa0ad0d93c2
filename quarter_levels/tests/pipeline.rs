mod common;
use common::{PRO_CATALOG, SIMPLE_CATALOG, bar, closes_from, date, flat_bars, ts, weekdays};

use quarter_levels::{
    Error,
    catalog::{AnalysisMode, CatalogEntry, CatalogSet, load_catalog_str},
    classify::classify,
    config::{EngineConfig, load_config_str},
    levels::{BandTone, DisplayWindow, LevelBook, QuarterSummary},
    models::{
        bar::Bar,
        level::{LevelDefinition, Percent},
        outcome::{OutcomeKey, Side},
    },
    normalize::normalize_json,
    pipeline::{AnalysisRequest, LevelEngine, analyze},
    quarters::find_quarter_ranges,
    scaler::{
        returns::PairedReturn,
        scale_levels,
        stats::vol_ratio,
    },
};

fn engine() -> LevelEngine {
    LevelEngine::new(
        EngineConfig::default(),
        CatalogSet {
            simple: load_catalog_str(SIMPLE_CATALOG).unwrap(),
            pro: load_catalog_str(PRO_CATALOG).unwrap(),
        },
    )
}

/// Q1 2024 series around 100 with a long breakout late in the quarter.
fn breakout_bars() -> Vec<Bar> {
    let mut bars = flat_bars(date(2024, 1, 2), 20, 100.0);
    let d = weekdays(date(2024, 1, 2), 20)[10];
    bars[10] = bar(d, 100.0, 106.0, 100.0, 105.0);
    bars
}

/// Benchmark closes with some movement, and an asset whose log returns are
/// exactly twice the benchmark's.
fn doubled_pair() -> (Vec<Bar>, Vec<Bar>) {
    let bench: Vec<f64> = (0..60).map(|i| 100.0 + ((i * 7) % 11) as f64).collect();
    let asset: Vec<f64> = bench.iter().map(|c| c * c / 100.0).collect();
    let from = date(2024, 1, 2);
    (closes_from(from, &asset), closes_from(from, &bench))
}

#[test]
fn scenario_long_breakout_then_failure() {
    // Friday anchor at index 3; prior + anchor define 110 / 90.
    let days = weekdays(date(2024, 1, 2), 8);
    let mut bars: Vec<Bar> = days.iter().map(|&d| bar(d, 100.0, 101.0, 99.0, 100.0)).collect();
    bars[2] = bar(days[2], 100.0, 108.0, 95.0, 100.0);
    bars[3] = bar(days[3], 100.0, 110.0, 90.0, 100.0);
    bars[5] = bar(days[5], 110.0, 116.0, 109.0, 115.0);
    bars[6] = bar(days[6], 90.0, 91.0, 84.0, 85.0);

    let ranges = find_quarter_ranges(&bars);
    assert_eq!(ranges.len(), 1);
    let r = &ranges[0];
    assert_eq!((r.anchor_index, r.high, r.low), (3, 110.0, 90.0));
    assert_eq!(classify(r, &bars), OutcomeKey::LongFailed);
    assert_eq!(r.confirmation.map(|c| c.side), Some(Side::Long));
    assert_eq!(r.failure.map(|f| f.time), Some(bars[6].time));
}

#[test]
fn scenario_benchmark_levels_scaled_by_two() {
    let (asset, bench) = doubled_pair();
    let entry = CatalogEntry {
        lines: vec![LevelDefinition::new("Long_High_20", 5.0)],
        ..Default::default()
    };
    let set = scale_levels("NDX", &asset, &bench, Some(&entry), &EngineConfig::default()).unwrap();
    assert_eq!(set.scaling.vol_ratio, 2.0);
    assert_eq!(set.lines[0].percent, Percent::Number(10.0));
}

#[test]
fn scenario_no_fridays_no_ranges() {
    // Monday..Thursday of a single week.
    let bars: Vec<Bar> = weekdays(date(2024, 1, 8), 4)
        .into_iter()
        .map(|d| bar(d, 1.0, 1.0, 1.0, 1.0))
        .collect();
    assert!(find_quarter_ranges(&bars).is_empty());
    let result = engine()
        .analyze(&AnalysisRequest::new("SPX", AnalysisMode::Pro), &bars, None)
        .unwrap();
    assert!(result.ranges.is_empty());
    assert!(result.summary.is_none());
}

#[test]
fn scenario_vol_ratio_two_before_clamp() {
    let bench = [0.01, -0.01, 0.01, -0.01, 0.01, -0.01, 0.01, -0.01];
    let paired: Vec<PairedReturn> = bench
        .iter()
        .enumerate()
        .map(|(i, &b)| PairedReturn {
            time: i as i64 * 86_400,
            asset: 2.0 * b,
            benchmark: b,
        })
        .collect();
    let v = vol_ratio(&paired, 1250, 2);
    assert!((v.ratio - 2.0).abs() < 1e-12);
    assert!((v.sd_asset - 2.0 * v.sd_benchmark).abs() < 1e-15);
}

#[test]
fn scenario_unresolved_range_summary_is_mid() {
    let bars = flat_bars(date(2024, 1, 2), 20, 100.0);
    let result = engine()
        .analyze(&AnalysisRequest::new("SPX", AnalysisMode::Pro), &bars, None)
        .unwrap();
    let latest = result.ranges.last().unwrap();
    assert_eq!(latest.detected, OutcomeKey::None);
    assert_eq!(latest.scenario, OutcomeKey::None);
    assert!(latest.levels.bands.is_empty());
    assert_eq!(result.summary, Some(QuarterSummary::at_mid(latest.range.mid, 2)));
    assert_eq!(result.summary.unwrap().upper20, 100.0);
}

#[test]
fn pro_mode_maps_fixed_bands_and_summary() {
    let result = engine()
        .analyze(&AnalysisRequest::new("spx", AnalysisMode::Pro), &breakout_bars(), None)
        .unwrap();
    assert_eq!(result.symbol, "SPX");
    let latest = result.ranges.last().unwrap();
    assert_eq!(latest.detected, OutcomeKey::LongConfirmed);
    assert_eq!(latest.levels.mid_price, 100.0);

    let tones: Vec<BandTone> = latest.levels.bands.iter().map(|b| b.band.tone).collect();
    assert_eq!(tones, vec![BandTone::Purple, BandTone::Blue]);

    let summary = result.summary.unwrap();
    insta::assert_snapshot!(summary.to_string(), @r"
    upper 20%: 110.00
    upper 50%: 105.00
    upper 80%: 102.50
    lower 20%: 90.00
    lower 50%: 95.00
    lower 80%: 97.50
    ");
    insta::assert_json_snapshot!(summary, @r#"
    {
      "upper20": 110.0,
      "upper50": 105.0,
      "upper80": 102.5,
      "lower20": 90.0,
      "lower50": 95.0,
      "lower80": 97.5
    }
    "#);
}

#[test]
fn pro_mode_selected_outcome_overrides_latest_range() {
    let mut bars = flat_bars(date(2024, 1, 2), 70, 100.0);
    // Breakout in Q1 so the earlier range classifies on its own.
    bars[10].close = 105.0;
    bars[10].high = 106.0;

    let request = AnalysisRequest {
        outcome: OutcomeKey::ShortConfirmed,
        ..AnalysisRequest::new("SPX", AnalysisMode::Pro)
    };
    let result = engine().analyze(&request, &bars, None).unwrap();
    assert_eq!(result.ranges.len(), 2);
    assert_eq!(result.ranges[0].scenario, OutcomeKey::LongConfirmed);
    assert_eq!(result.ranges[1].scenario, OutcomeKey::ShortConfirmed);

    let s = result.summary.unwrap();
    assert_eq!((s.upper20, s.lower20, s.lower50, s.upper50), (104.0, 88.0, 94.0, 100.0));
}

#[test]
fn simple_mode_uses_named_levels_and_symmetric_bands() {
    let result = engine()
        .analyze(&AnalysisRequest::new("SPX", AnalysisMode::Simple), &breakout_bars(), None)
        .unwrap();
    let latest = result.ranges.last().unwrap();
    assert_eq!(latest.scenario, OutcomeKey::LongConfirmed);
    assert_eq!(latest.levels.lines.len(), 6);
    let pairs: Vec<(f64, f64)> = latest
        .levels
        .bands
        .iter()
        .map(|b| (b.band.low_percent, b.band.high_percent))
        .collect();
    assert_eq!(pairs, vec![(-1.0, 1.0), (-2.0, 2.0), (-4.0, 4.0)]);

    let s = result.summary.unwrap();
    assert_eq!(
        (s.upper20, s.upper50, s.upper80, s.lower20, s.lower50, s.lower80),
        (104.0, 102.0, 101.0, 96.0, 98.0, 99.0)
    );
}

#[test]
fn simple_mode_unresolved_range_still_draws_long_levels() {
    let bars = flat_bars(date(2024, 1, 2), 20, 100.0);
    let book = LevelBook::from_definitions(&load_catalog_str(SIMPLE_CATALOG).unwrap()["SPX"].lines);
    let result = analyze(
        &bars,
        &book,
        &AnalysisRequest::new("SPX", AnalysisMode::Simple),
        &EngineConfig::default(),
    );
    let latest = result.ranges.last().unwrap();
    assert_eq!(latest.detected, OutcomeKey::None);
    assert_eq!(latest.scenario, OutcomeKey::LongConfirmed);
    assert_eq!(latest.levels.lines.len(), 6);
}

#[test]
fn beta_mode_rescales_benchmark_levels() {
    let (asset, bench) = doubled_pair();
    let result = engine()
        .analyze(&AnalysisRequest::new("NDX", AnalysisMode::Beta), &asset, Some(&bench))
        .unwrap();
    assert_eq!(result.symbol, "NDX");
    let scaling = result.scaling.unwrap();
    assert_eq!(scaling.vol_ratio, 2.0);
    assert_eq!(scaling.benchmark, "SPX");
    assert_eq!(scaling.sample_size, 59);
    assert_eq!(scaling.lookback_days, 59);
    assert!(!result.ranges.is_empty());
}

#[test]
fn beta_mode_for_benchmark_itself_is_neutral() {
    let bars = breakout_bars();
    let result = engine()
        .analyze(&AnalysisRequest::new("SPX", AnalysisMode::Beta), &bars, None)
        .unwrap();
    let scaling = result.scaling.unwrap();
    assert_eq!((scaling.vol_ratio, scaling.beta), (1.0, 1.0));
    assert_eq!(scaling.sample_size, bars.len());
}

#[test]
fn lookup_failures() {
    let bars = breakout_bars();
    let err = engine()
        .analyze(&AnalysisRequest::new("GC", AnalysisMode::Pro), &bars, None)
        .unwrap_err();
    assert!(matches!(err, Error::SymbolNotFound { .. }));

    let err = engine()
        .analyze(&AnalysisRequest::new("NDX", AnalysisMode::Beta), &bars, None)
        .unwrap_err();
    assert!(matches!(err, Error::BenchmarkBarsMissing { .. }));
    assert_eq!(err.to_string(), "beta mode for NDX requires SPX bars");

    let empty = LevelEngine::new(EngineConfig::default(), CatalogSet::default());
    let err = empty
        .analyze(&AnalysisRequest::new("NDX", AnalysisMode::Beta), &bars, Some(&bars))
        .unwrap_err();
    assert!(matches!(err, Error::BenchmarkUnavailable { .. }));
    assert_eq!(
        err.to_string(),
        "benchmark levels unavailable: no catalog entry for SPX"
    );
}

#[test]
fn result_serializes_for_rendering() {
    let result = engine()
        .analyze(&AnalysisRequest::new("SPX", AnalysisMode::Pro), &breakout_bars(), None)
        .unwrap();
    let v = serde_json::to_value(&result).unwrap();
    let latest = &v["ranges"][0];
    assert_eq!(latest["key"], "2024-Q1");
    assert_eq!(latest["detected"], "LONG_CONFIRMED");
    assert_eq!(latest["confirmation"]["side"], "LONG");
    assert_eq!(latest["levels"]["bands"][0]["tone"], "purple");
    assert_eq!(v["mode"], "pro");
}

#[test]
fn display_window_snaps_onto_bar_times() {
    let result = engine()
        .analyze(&AnalysisRequest::new("SPX", AnalysisMode::Pro), &breakout_bars(), None)
        .unwrap();
    // Range runs from Fri 2024-01-05 to one day past Mon 2024-01-29; the
    // day-trimmed start (Sat 01-06) snaps forward to Mon 01-08.
    assert_eq!(
        result.ranges[0].levels.window,
        Some(DisplayWindow {
            start: ts(date(2024, 1, 8)),
            end: ts(date(2024, 1, 29)),
        })
    );
}

#[test]
fn flat_benchmark_scales_neutrally() {
    let from = date(2024, 1, 2);
    let bench = closes_from(from, &[100.0; 30]);
    let asset = closes_from(from, &(0..30).map(|i| 50.0 + (i % 4) as f64).collect::<Vec<_>>());
    let entry = CatalogEntry {
        lines: vec![LevelDefinition::new("LONG_TRUE_9", 5.0)],
        ..Default::default()
    };
    let set = scale_levels("NDX", &asset, &bench, Some(&entry), &EngineConfig::default()).unwrap();
    assert_eq!((set.scaling.vol_ratio, set.scaling.raw_vol_ratio, set.scaling.beta), (1.0, 1.0, 1.0));
    assert_eq!(set.scaling.sample_size, 29);
    assert_eq!(set.lines, entry.lines);
}

#[test]
fn single_paired_return_scales_neutrally() {
    let from = date(2024, 1, 2);
    let asset = closes_from(from, &[100.0, 110.0]);
    let bench = closes_from(from, &[100.0, 101.0]);
    let entry = CatalogEntry {
        lines: vec![LevelDefinition::new("LONG_TRUE_9", 5.0)],
        ..Default::default()
    };
    let set = scale_levels("NDX", &asset, &bench, Some(&entry), &EngineConfig::default()).unwrap();
    assert_eq!((set.scaling.vol_ratio, set.scaling.beta), (1.0, 1.0));
    assert_eq!(set.scaling.sample_size, 1);
    assert_eq!(set.lines[0].percent, Percent::Number(5.0));
}

#[test]
fn clamp_bounds_and_unvalidated_clamp() {
    let (asset, bench) = doubled_pair();
    let entry = CatalogEntry {
        lines: vec![LevelDefinition::new("LONG_TRUE_9", 5.0)],
        ..Default::default()
    };

    // The smallest clamp config validation accepts pins the ratio to 1.
    let tight = load_config_str("vol_clamp = 1.0").unwrap();
    let set = scale_levels("NDX", &asset, &bench, Some(&entry), &tight).unwrap();
    assert_eq!((set.scaling.vol_ratio, set.scaling.raw_vol_ratio), (1.0, 2.0));
    assert!(load_config_str("vol_clamp = 0.5").is_err());

    // A config built in code skips validation; a clamp below 1 bounds nothing.
    let loose = EngineConfig {
        vol_clamp: 0.5,
        ..Default::default()
    };
    let set = scale_levels("NDX", &asset, &bench, Some(&entry), &loose).unwrap();
    assert_eq!(set.scaling.vol_ratio, 2.0);
    assert_eq!(set.lines[0].percent, Percent::Number(10.0));

    let nan = EngineConfig {
        vol_clamp: f64::NAN,
        ..Default::default()
    };
    let result = LevelEngine::new(
        nan,
        CatalogSet {
            pro: load_catalog_str(PRO_CATALOG).unwrap(),
            ..Default::default()
        },
    )
    .analyze(&AnalysisRequest::new("NDX", AnalysisMode::Beta), &asset, Some(&bench))
    .unwrap();
    assert_eq!(result.scaling.unwrap().vol_ratio, 2.0);
}

#[test]
fn out_of_range_times_are_dropped_before_detection() {
    let bars = normalize_json(
        r#"[
            {"time": "2024-01-05", "open": 1, "high": 2, "low": 0.5, "close": 1.5},
            {"time": 1e22, "open": 1, "high": 2, "low": 0.5, "close": 1.5},
            {"time": -1e300, "open": 1, "high": 2, "low": 0.5, "close": 1.5}
        ]"#,
    )
    .unwrap();
    assert_eq!(bars.len(), 1);
    assert_eq!(bars[0].time, ts(date(2024, 1, 5)));

    let ranges = find_quarter_ranges(&bars);
    assert_eq!(ranges.len(), 1);
    assert_eq!(ranges[0].end_time, bars[0].time + 86_400);
}

#[test]
fn far_future_bar_built_in_code_does_not_overflow() {
    let mut bars = flat_bars(date(2024, 1, 2), 5, 100.0);
    let last = bars[4];
    bars.push(Bar { time: i64::MAX, ..last });
    let result = engine()
        .analyze(&AnalysisRequest::new("SPX", AnalysisMode::Pro), &bars, None)
        .unwrap();
    assert_eq!(result.ranges.len(), 1);
    assert_eq!(result.ranges[0].range.end_time, i64::MAX);
}
