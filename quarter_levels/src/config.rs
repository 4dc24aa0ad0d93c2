//! Engine configuration: parsing, validation, and loading.
//!
//! Every field has a default, so an empty TOML document is a valid config:
//!
//! ```toml
//! benchmark = "SPX"
//! beta_lookback = 252
//! vol_lookback = 1250
//! vol_clamp = 5.0
//! min_paired_samples = 2
//! preferred_magnitudes = [2.5, 5.0, 7.5, 10.0]
//! summary_decimals = 2
//! week_time_zone = "America/New_York"
//!
//! [level_aliases]
//! NQ = "NDX"
//! BTCUSD = "BTC"
//!
//! [bar_aliases]
//! SPX = "ES"
//! NDX = "NQ"
//! BTC = "BTCUSD"
//! ```
//!
//! Entrypoints:
//! - Parse + validate from a TOML string: [`load_config_str`]
//! - Parse + validate from a file path: [`load_config_path`]

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{Error, Result, aggregate::parse_tz};

/// Tunables of the pipeline and the scaler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Catalog key of the benchmark whose levels beta mode rescales.
    pub benchmark: String,
    /// Trailing paired returns used for beta.
    pub beta_lookback: usize,
    /// Trailing paired returns used for the volatility ratio.
    pub vol_lookback: usize,
    /// The ratio is clamped to `[1 / vol_clamp, vol_clamp]`.
    pub vol_clamp: f64,
    /// Below this many paired returns both estimators return `1.0`.
    pub min_paired_samples: usize,
    /// Magnitudes emitted first by symmetric pairing.
    pub preferred_magnitudes: Vec<f64>,
    /// Requested symbol -> catalog key.
    pub level_aliases: IndexMap<String, String>,
    /// Catalog key -> symbol of its bar series.
    pub bar_aliases: IndexMap<String, String>,
    /// Decimals of the six-value summary.
    pub summary_decimals: u32,
    /// IANA zone for weekly aggregation.
    pub week_time_zone: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let pairs = |xs: &[(&str, &str)]| -> IndexMap<String, String> {
            xs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
        };
        Self {
            benchmark: "SPX".into(),
            beta_lookback: 252,
            vol_lookback: 1250,
            vol_clamp: 5.0,
            min_paired_samples: 2,
            preferred_magnitudes: vec![2.5, 5.0, 7.5, 10.0],
            level_aliases: pairs(&[("NQ", "NDX"), ("BTCUSD", "BTC")]),
            bar_aliases: pairs(&[("SPX", "ES"), ("NDX", "NQ"), ("BTC", "BTCUSD")]),
            summary_decimals: 2,
            week_time_zone: crate::aggregate::DEFAULT_WEEK_TZ.into(),
        }
    }
}

fn normalize_symbol(s: &str) -> String {
    s.trim().to_ascii_uppercase()
}

impl EngineConfig {
    /// Catalog key for a requested symbol.
    pub fn level_symbol(&self, symbol: &str) -> String {
        let s = normalize_symbol(symbol);
        self.level_aliases.get(&s).cloned().unwrap_or(s)
    }

    /// Bar-series symbol for a catalog key.
    pub fn bar_symbol(&self, catalog_key: &str) -> String {
        let s = normalize_symbol(catalog_key);
        self.bar_aliases.get(&s).cloned().unwrap_or(s)
    }

    /// Bar file `<dir>/<bar symbol>.json` holding the series of a catalog key.
    pub fn bar_file(&self, dir: &Path, catalog_key: &str) -> PathBuf {
        dir.join(format!("{}.json", self.bar_symbol(catalog_key)))
    }

    /// Upper-case symbols and alias maps, then check every constraint.
    ///
    /// Errors:
    /// - [`Error::Config`] for an empty benchmark, lookbacks below 2,
    ///   a clamp below 1, non-finite magnitudes, or an unknown time zone
    pub fn normalize(&mut self) -> Result<()> {
        self.benchmark = normalize_symbol(&self.benchmark);
        if self.benchmark.is_empty() {
            return Err(Error::Config("benchmark cannot be empty".into()));
        }
        if self.beta_lookback < 2 || self.vol_lookback < 2 {
            return Err(Error::Config(format!(
                "lookbacks must be at least 2 (beta_lookback={}, vol_lookback={})",
                self.beta_lookback, self.vol_lookback
            )));
        }
        if !(self.vol_clamp.is_finite() && self.vol_clamp >= 1.0) {
            return Err(Error::Config(format!(
                "vol_clamp must be a finite number >= 1, got {}",
                self.vol_clamp
            )));
        }
        if self.preferred_magnitudes.iter().any(|m| !m.is_finite()) {
            return Err(Error::Config("preferred_magnitudes must be finite".into()));
        }
        parse_tz(&self.week_time_zone)?;

        for map in [&mut self.level_aliases, &mut self.bar_aliases] {
            *map = std::mem::take(map)
                .into_iter()
                .map(|(k, v)| (normalize_symbol(&k), normalize_symbol(&v)))
                .collect();
        }
        Ok(())
    }
}

/// Parse and validate a config from a TOML string.
///
/// Errors:
/// - TOML parse failures, including unknown keys ([`Error::Toml`])
/// - Validation errors (see [`EngineConfig::normalize`])
pub fn load_config_str(toml_str: &str) -> Result<EngineConfig> {
    let mut cfg: EngineConfig = toml::from_str(toml_str)?;
    cfg.normalize()?;
    Ok(cfg)
}

/// Read a config TOML file from disk, parse, and validate it.
pub fn load_config_path(path: impl AsRef<std::path::Path>) -> Result<EngineConfig> {
    let text = std::fs::read_to_string(path.as_ref())?;
    load_config_str(&text)
}
