//! Beta / volatility scaling of benchmark levels onto another asset.
//!
//! The benchmark's percentage levels are multiplied by the clamped ratio of the
//! asset's return volatility to the benchmark's. Beta is computed alongside for
//! reference only; it never scales anything.

pub mod returns;
pub mod stats;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    Error, Result,
    catalog::CatalogEntry,
    config::EngineConfig,
    levels::round_to,
    models::{
        bar::Bar,
        level::{LevelDefinition, Percent},
    },
};

use self::{
    returns::paired_returns,
    stats::{BetaEstimate, VolRatio, beta, clamp_ratio, vol_ratio},
};

/// Decimals kept on a scaled percent.
pub const SCALED_PERCENT_DECIMALS: u32 = 6;
/// Decimals kept on the reported ratios and beta.
pub const META_DECIMALS: u32 = 4;

/// How a scaled set was derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalingMeta {
    /// Clamped ratio actually applied (4 decimals).
    pub vol_ratio: f64,
    /// Ratio before clamping (4 decimals).
    pub raw_vol_ratio: f64,
    /// Beta against the benchmark (4 decimals).
    pub beta: f64,
    /// `min(vol_lookback, sample_size)`.
    pub lookback_days: usize,
    /// Benchmark catalog key.
    pub benchmark: String,
    /// Points behind the volatility ratio.
    pub sample_size: usize,
}

/// Benchmark levels rescaled for one asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaledLevelSet {
    /// Asset the levels were scaled for.
    pub symbol: String,
    /// Publication date of the benchmark levels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asof: Option<String>,
    /// Rescaled definitions, in benchmark order.
    pub lines: Vec<LevelDefinition>,
    /// Derivation metadata.
    pub scaling: ScalingMeta,
    /// The benchmark entry's own metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benchmark_meta: Option<serde_json::Map<String, serde_json::Value>>,
}

impl ScaledLevelSet {
    /// As a catalog entry: the benchmark's meta merged with a `beta` object.
    pub fn to_catalog_entry(&self) -> Result<CatalogEntry> {
        let mut meta = self.benchmark_meta.clone().unwrap_or_default();
        meta.insert("beta".into(), serde_json::to_value(&self.scaling)?);
        Ok(CatalogEntry {
            symbol: Some(self.symbol.clone()),
            asof: self.asof.clone(),
            lines: self.lines.clone(),
            meta: Some(meta),
        })
    }
}

/// Raw estimates before rounding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalingStats {
    /// Volatility ratio estimate.
    pub vol: VolRatio,
    /// Beta estimate.
    pub beta: BetaEstimate,
    /// Ratio after clamping.
    pub clamped_ratio: f64,
}

/// Estimate the volatility ratio and beta of `asset` against `benchmark`.
///
/// When `asset_id` names the benchmark both are exactly `1.0` and the sample
/// size is the benchmark's bar count.
pub fn compute_scaling(
    asset_id: &str,
    asset_bars: &[Bar],
    benchmark_bars: &[Bar],
    config: &EngineConfig,
) -> ScalingStats {
    if config.level_symbol(asset_id) == config.benchmark {
        let n = benchmark_bars.len();
        return ScalingStats {
            vol: VolRatio {
                ratio: 1.0,
                sample_size: n,
                sd_asset: 0.0,
                sd_benchmark: 0.0,
            },
            beta: BetaEstimate { beta: 1.0, sample_size: n },
            clamped_ratio: 1.0,
        };
    }

    let paired = paired_returns(asset_bars, benchmark_bars);
    let vol = vol_ratio(&paired, config.vol_lookback, config.min_paired_samples);
    let beta = beta(&paired, config.beta_lookback, config.min_paired_samples);
    let clamped_ratio = clamp_ratio(vol.ratio, config.vol_clamp);

    info!(
        asset = asset_id,
        benchmark = %config.benchmark,
        vol_ratio = vol.ratio,
        clamped_ratio,
        beta = beta.beta,
        vol_sample = vol.sample_size,
        beta_sample = beta.sample_size,
        sd_asset = vol.sd_asset,
        sd_benchmark = vol.sd_benchmark,
        asset_bars = asset_bars.len(),
        benchmark_bars = benchmark_bars.len(),
        "computed volatility scaling"
    );

    ScalingStats { vol, beta, clamped_ratio }
}

/// Multiply every numeric percent by `ratio`, rounded to six decimals.
/// Non-numeric percents pass through unchanged.
pub fn scale_definitions(defs: &[LevelDefinition], ratio: f64) -> Vec<LevelDefinition> {
    defs.iter()
        .map(|d| match d.percent.value() {
            Some(p) => LevelDefinition {
                percent: Percent::Number(round_to(p * ratio, SCALED_PERCENT_DECIMALS)),
                ..d.clone()
            },
            None => d.clone(),
        })
        .collect()
}

/// Rescale the benchmark's levels for `asset_id`.
///
/// Errors:
/// - [`Error::BenchmarkUnavailable`] when `benchmark_entry` is `None`
pub fn scale_levels(
    asset_id: &str,
    asset_bars: &[Bar],
    benchmark_bars: &[Bar],
    benchmark_entry: Option<&CatalogEntry>,
    config: &EngineConfig,
) -> Result<ScaledLevelSet> {
    let entry = benchmark_entry.ok_or_else(|| Error::BenchmarkUnavailable {
        benchmark: config.benchmark.clone(),
    })?;

    let stats = compute_scaling(asset_id, asset_bars, benchmark_bars, config);
    let sample_size = stats.vol.sample_size;

    Ok(ScaledLevelSet {
        symbol: asset_id.trim().to_ascii_uppercase(),
        asof: entry.asof.clone(),
        lines: scale_definitions(&entry.lines, stats.clamped_ratio),
        scaling: ScalingMeta {
            vol_ratio: round_to(stats.clamped_ratio, META_DECIMALS),
            raw_vol_ratio: round_to(stats.vol.ratio, META_DECIMALS),
            beta: round_to(stats.beta.beta, META_DECIMALS),
            lookback_days: config.vol_lookback.min(sample_size),
            benchmark: config.benchmark.clone(),
            sample_size,
        },
        benchmark_meta: entry.meta.clone(),
    })
}
