//! End-to-end analysis: bars and level definitions in, annotated ranges out.
//!
//! [`analyze`] is the pure core over an already-built [`LevelBook`].
//! [`LevelEngine`] adds catalog resolution and the beta-mode scaler path.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    Error, Result,
    catalog::{AnalysisMode, CatalogSet},
    classify::classify_all,
    config::EngineConfig,
    levels::{
        LevelBook, PairingStrategy, QuarterSummary, RangeLevels, map_range_levels,
        window::snap_window_to_bars,
    },
    models::{
        bar::Bar,
        level::LevelDefinition,
        outcome::{OutcomeBucket, OutcomeKey, Side},
        range::QuarterRange,
    },
    quarters::find_quarter_ranges,
    scaler::{ScalingMeta, scale_levels},
};

/// What to analyze and how.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Requested symbol (aliases are applied by [`LevelEngine`]).
    pub symbol: String,
    /// Analysis mode.
    #[serde(default)]
    pub mode: AnalysisMode,
    /// Caller-selected outcome; `Auto` means classify.
    #[serde(default)]
    pub outcome: OutcomeKey,
}

impl AnalysisRequest {
    /// Request in `mode` with an `Auto` outcome.
    pub fn new(symbol: impl Into<String>, mode: AnalysisMode) -> Self {
        Self {
            symbol: symbol.into(),
            mode,
            outcome: OutcomeKey::Auto,
        }
    }
}

/// A range with its classification and mapped levels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedRange {
    /// The detected range.
    #[serde(flatten)]
    pub range: QuarterRange,
    /// Classifier output.
    pub detected: OutcomeKey,
    /// Outcome whose levels were drawn (after mode rules); `None` is mid-only.
    pub scenario: OutcomeKey,
    /// Levels mapped onto the range.
    pub levels: RangeLevels,
}

/// Result of one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Catalog key the levels came from.
    pub symbol: String,
    /// Mode analyzed in.
    pub mode: AnalysisMode,
    /// Ranges in chronological order.
    pub ranges: Vec<AnnotatedRange>,
    /// Six-value summary of the latest range; `None` without ranges.
    pub summary: Option<QuarterSummary>,
    /// Scaler metadata, beta mode only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaling: Option<ScalingMeta>,
}

/// Pairing strategy used by `mode`.
pub fn pairing_for(mode: AnalysisMode, config: &EngineConfig) -> PairingStrategy {
    match mode {
        AnalysisMode::Simple => PairingStrategy::SymmetricMagnitude {
            preferred: config.preferred_magnitudes.clone(),
        },
        AnalysisMode::Pro | AnalysisMode::Overlay | AnalysisMode::Beta => PairingStrategy::FixedIndex,
    }
}

/// Outcome whose levels a range is drawn with.
///
/// - Simple: the detected side's confirmed bucket; an unresolved range falls
///   back to whichever of LONG/SHORT confirmed has levels, else `None`.
/// - Pro: a selected outcome overrides the latest range only.
/// - Overlay / Beta: always the detected outcome.
pub fn resolve_scenario(
    mode: AnalysisMode,
    detected: OutcomeKey,
    selected: OutcomeKey,
    is_latest: bool,
    book: &LevelBook,
) -> OutcomeKey {
    match mode {
        AnalysisMode::Simple => match detected.side() {
            Some(Side::Long) => OutcomeKey::LongConfirmed,
            Some(Side::Short) => OutcomeKey::ShortConfirmed,
            None if book.has(OutcomeBucket::LongConfirmed) => OutcomeKey::LongConfirmed,
            None if book.has(OutcomeBucket::ShortConfirmed) => OutcomeKey::ShortConfirmed,
            None => OutcomeKey::None,
        },
        AnalysisMode::Pro if is_latest && selected != OutcomeKey::Auto => selected,
        AnalysisMode::Pro | AnalysisMode::Overlay | AnalysisMode::Beta => detected,
    }
}

/// Six-value summary of the latest range.
///
/// Simple mode reads `{Long|Short}_{High|Low}_{20|50|80}` by the detected
/// side (short only when the range resolved short). Every other mode reads
/// the fixed indices of the selected outcome, or of the detected one under
/// `Auto`; an unresolved `NONE` puts every slot at mid.
pub fn summarize(
    mode: AnalysisMode,
    range: &QuarterRange,
    detected: OutcomeKey,
    selected: OutcomeKey,
    book: &LevelBook,
    decimals: u32,
) -> QuarterSummary {
    if mode == AnalysisMode::Simple {
        let side = detected.side().unwrap_or(Side::Long);
        return QuarterSummary::from_simple_names(range.mid, book, side, decimals);
    }
    let scenario = if selected == OutcomeKey::Auto { detected } else { selected };
    match scenario.bucket() {
        Some(b) => QuarterSummary::from_indices(range.mid, &book.index_map(b), decimals),
        None => QuarterSummary::at_mid(range.mid, decimals),
    }
}

/// Detect, classify, and map levels for every range of `bars`.
///
/// Display windows are snapped onto `bars`. Never fails; sparse input yields
/// an empty result.
pub fn analyze(
    bars: &[Bar],
    book: &LevelBook,
    request: &AnalysisRequest,
    config: &EngineConfig,
) -> AnalysisResult {
    let strategy = pairing_for(request.mode, config);
    let ranges = find_quarter_ranges(bars);
    let outcomes = classify_all(&ranges, bars);
    let last = ranges.len().saturating_sub(1);

    let annotated: Vec<AnnotatedRange> = ranges
        .into_iter()
        .zip(outcomes)
        .enumerate()
        .map(|(i, (range, detected))| {
            let scenario = resolve_scenario(request.mode, detected, request.outcome, i == last, book);
            let mut levels = map_range_levels(&range, book, scenario.bucket(), &strategy);
            levels.window = levels.window.and_then(|w| snap_window_to_bars(w, bars));
            AnnotatedRange {
                range,
                detected,
                scenario,
                levels,
            }
        })
        .collect();

    let summary = annotated.last().map(|a| {
        summarize(
            request.mode,
            &a.range,
            a.detected,
            request.outcome,
            book,
            config.summary_decimals,
        )
    });

    debug!(
        symbol = %request.symbol,
        mode = %request.mode,
        ranges = annotated.len(),
        "analysis complete"
    );

    AnalysisResult {
        symbol: request.symbol.trim().to_ascii_uppercase(),
        mode: request.mode,
        ranges: annotated,
        summary,
        scaling: None,
    }
}

/// Catalog-aware façade over [`analyze`].
#[derive(Debug, Clone, Default)]
pub struct LevelEngine {
    config: EngineConfig,
    catalogs: CatalogSet,
}

impl LevelEngine {
    /// Engine over validated `config` and loaded `catalogs`.
    pub fn new(config: EngineConfig, catalogs: CatalogSet) -> Self {
        Self { config, catalogs }
    }

    /// Level definitions for `symbol` in `mode`, plus scaler metadata in beta mode.
    ///
    /// Beta mode rescales the benchmark entry using `benchmark_bars`; these may
    /// be omitted only when `symbol` is the benchmark itself.
    ///
    /// Errors:
    /// - [`Error::SymbolNotFound`] / [`Error::BenchmarkUnavailable`] from catalog lookup
    /// - [`Error::BenchmarkBarsMissing`] for beta mode without benchmark bars
    pub fn levels_for(
        &self,
        symbol: &str,
        mode: AnalysisMode,
        asset_bars: &[Bar],
        benchmark_bars: Option<&[Bar]>,
    ) -> Result<(String, Vec<LevelDefinition>, Option<ScalingMeta>)> {
        let (key, entry) = self.catalogs.resolve(symbol, mode, &self.config)?;
        if mode != AnalysisMode::Beta {
            return Ok((key.to_string(), entry.lines.clone(), None));
        }

        let is_benchmark = self.config.level_symbol(symbol) == self.config.benchmark;
        let benchmark_bars = match benchmark_bars {
            Some(b) => b,
            None if is_benchmark => asset_bars,
            None => {
                return Err(Error::BenchmarkBarsMissing {
                    symbol: self.config.level_symbol(symbol),
                    benchmark: self.config.benchmark.clone(),
                });
            }
        };
        let scaled = scale_levels(symbol, asset_bars, benchmark_bars, Some(entry), &self.config)?;
        Ok((scaled.symbol, scaled.lines, Some(scaled.scaling)))
    }

    /// Resolve levels for the request and run [`analyze`] over `bars`.
    pub fn analyze(
        &self,
        request: &AnalysisRequest,
        bars: &[Bar],
        benchmark_bars: Option<&[Bar]>,
    ) -> Result<AnalysisResult> {
        let (key, lines, scaling) = self.levels_for(&request.symbol, request.mode, bars, benchmark_bars)?;
        let book = LevelBook::from_definitions(&lines);
        if book.is_empty() {
            warn!(symbol = %key, mode = %request.mode, "no usable level definitions; ranges get mid only");
        }
        let mut result = analyze(bars, &book, request, &self.config);
        result.symbol = key;
        result.scaling = scaling;
        Ok(result)
    }
}
