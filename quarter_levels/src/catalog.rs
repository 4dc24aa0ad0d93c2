//! Level catalogs: parsing, normalization, and loading.
//!
//! A catalog maps an instrument symbol to its level definitions:
//!
//! ```json
//! { "SPX": { "asof": "2024-06-28", "daily": { "lines": [ {"name": "LONG_TRUE_5", "value": 0.8} ] } } }
//! ```
//!
//! Key behaviors:
//! - Entries accept both the nested `daily.lines` shape and a flat `lines` list.
//! - Normalization trims and upper-cases symbol keys, rejects keys that collide
//!   after normalization, and drops lines with an empty name.
//! - Two catalogs serve the analysis modes: "simple" for [`AnalysisMode::Simple`]
//!   and "pro" for everything else (including the benchmark entry for
//!   [`AnalysisMode::Beta`]). See [`CatalogSet`].
//!
//! Entrypoints:
//! - Parse + normalize from a JSON string: [`load_catalog_str`]
//! - Parse + normalize from a file path: [`load_catalog_path`]

use std::{fmt, str::FromStr};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    Error, Result,
    config::EngineConfig,
    models::level::{LevelDefinition, ParsedName},
};

/// Analysis mode selected by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    /// Basic catalog; every level drawn as a line, symmetric bands.
    Simple,
    /// Full catalog; fixed-index bands. A selected outcome overrides the latest range.
    #[default]
    Pro,
    /// Full catalog; every range auto-classified.
    Overlay,
    /// Benchmark levels rescaled by relative volatility.
    Beta,
}

impl AnalysisMode {
    /// Lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            AnalysisMode::Simple => "simple",
            AnalysisMode::Pro => "pro",
            AnalysisMode::Overlay => "overlay",
            AnalysisMode::Beta => "beta",
        }
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(AnalysisMode::Simple),
            "pro" => Ok(AnalysisMode::Pro),
            "overlay" => Ok(AnalysisMode::Overlay),
            "beta" => Ok(AnalysisMode::Beta),
            _ => Err(format!("unknown analysis mode: {s}")),
        }
    }
}

/// Wire shape of an entry; accepts both line layouts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RawEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    asof: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    lines: Option<Vec<LevelDefinition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    daily: Option<DailyLines>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    meta: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct DailyLines {
    #[serde(default)]
    lines: Vec<LevelDefinition>,
}

/// Levels published for one symbol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawEntry", into = "RawEntry")]
pub struct CatalogEntry {
    /// Symbol as written inside the entry, if any.
    pub symbol: Option<String>,
    /// Publication date (e.g., "2024-06-28").
    pub asof: Option<String>,
    /// Level definitions.
    pub lines: Vec<LevelDefinition>,
    /// Free-form metadata, carried through untouched.
    pub meta: Option<serde_json::Map<String, serde_json::Value>>,
}

impl From<RawEntry> for CatalogEntry {
    fn from(raw: RawEntry) -> Self {
        // The nested `daily.lines` layout wins when both are present.
        let lines = raw
            .daily
            .map(|d| d.lines)
            .or(raw.lines)
            .unwrap_or_default();
        CatalogEntry {
            symbol: raw.symbol,
            asof: raw.asof,
            lines,
            meta: raw.meta,
        }
    }
}

impl From<CatalogEntry> for RawEntry {
    fn from(e: CatalogEntry) -> Self {
        RawEntry {
            symbol: e.symbol,
            asof: e.asof,
            lines: None,
            daily: Some(DailyLines { lines: e.lines }),
            meta: e.meta,
        }
    }
}

/// Ordered map of symbol -> entry.
pub type LevelCatalog = IndexMap<String, CatalogEntry>;

/// Summary of changes performed during normalization.
///
/// All counters are additive for the processed catalog.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NormalizationReport {
    /// Symbol keys that changed when trimming/upper-casing.
    pub symbols_renamed: usize,
    /// Lines dropped for an empty name.
    pub lines_dropped: usize,
    /// Lines kept whose name has no outcome prefix (unusable for mapping).
    pub lines_unparsed: usize,
}

/// Normalize a catalog in place.
///
/// What normalization does:
/// - Upper-case + trim symbol keys; reject empty keys and duplicates after normalization
/// - Trim line names; drop lines whose name is empty
///
/// Errors:
/// - [`Error::Catalog`] for empty or colliding symbol keys
pub fn normalize_catalog(cat: &mut LevelCatalog) -> Result<NormalizationReport> {
    let mut report = NormalizationReport::default();
    let mut rebuilt: LevelCatalog = IndexMap::with_capacity(cat.len());

    for (raw_symbol, mut entry) in std::mem::take(cat) {
        let symbol = raw_symbol.trim().to_ascii_uppercase();
        if symbol.is_empty() {
            return Err(Error::Catalog("symbol cannot be empty after trimming".into()));
        }
        if symbol != raw_symbol {
            report.symbols_renamed += 1;
        }
        if rebuilt.contains_key(&symbol) {
            return Err(Error::Catalog(format!(
                "duplicate symbol after normalization: {symbol}"
            )));
        }

        let before = entry.lines.len();
        entry.lines.retain_mut(|l| {
            l.name = l.name.trim().to_string();
            !l.name.is_empty()
        });
        report.lines_dropped += before - entry.lines.len();

        let unparsed = entry
            .lines
            .iter()
            .filter(|l| ParsedName::parse(&l.name).is_none())
            .count();
        if unparsed > 0 {
            warn!(%symbol, unparsed, "level names without outcome prefix");
        }
        report.lines_unparsed += unparsed;

        rebuilt.insert(symbol, entry);
    }

    *cat = rebuilt;
    Ok(report)
}

/// Parse and normalize a catalog from a JSON string.
///
/// Errors:
/// - JSON parse failures ([`Error::Json`])
/// - Normalization errors (see [`normalize_catalog`])
pub fn load_catalog_str(json: &str) -> Result<LevelCatalog> {
    let mut cat: LevelCatalog = serde_json::from_str(json)?;
    let report = normalize_catalog(&mut cat)?;
    debug!(symbols = cat.len(), ?report, "loaded level catalog");
    Ok(cat)
}

/// Read a catalog JSON file from disk, parse, and normalize it.
///
/// See [`load_catalog_str`] for details on parsing and normalization.
pub fn load_catalog_path(path: impl AsRef<std::path::Path>) -> Result<LevelCatalog> {
    let text = std::fs::read_to_string(path.as_ref())?;
    load_catalog_str(&text)
}

/// The two catalogs the modes draw from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogSet {
    /// Basic levels, serving [`AnalysisMode::Simple`].
    pub simple: LevelCatalog,
    /// Full levels, serving every other mode and holding the benchmark entry.
    pub pro: LevelCatalog,
}

impl CatalogSet {
    /// Catalog serving `mode`.
    pub fn for_mode(&self, mode: AnalysisMode) -> &LevelCatalog {
        match mode {
            AnalysisMode::Simple => &self.simple,
            AnalysisMode::Pro | AnalysisMode::Overlay | AnalysisMode::Beta => &self.pro,
        }
    }

    /// Look up the entry for `symbol` in the catalog serving `mode`.
    ///
    /// The symbol is upper-cased and mapped through `config.level_aliases`.
    /// For [`AnalysisMode::Beta`] this is the benchmark entry regardless of
    /// `symbol`.
    ///
    /// Errors:
    /// - [`Error::BenchmarkUnavailable`] in beta mode without a benchmark entry
    /// - [`Error::SymbolNotFound`] otherwise
    pub fn resolve(
        &self,
        symbol: &str,
        mode: AnalysisMode,
        config: &EngineConfig,
    ) -> Result<(&str, &CatalogEntry)> {
        let key = match mode {
            AnalysisMode::Beta => config.benchmark.clone(),
            _ => config.level_symbol(symbol),
        };
        match self.for_mode(mode).get_key_value(&key) {
            Some((k, entry)) => Ok((k.as_str(), entry)),
            None if mode == AnalysisMode::Beta => Err(Error::BenchmarkUnavailable { benchmark: key }),
            None => Err(Error::SymbolNotFound { symbol: key, mode }),
        }
    }
}
