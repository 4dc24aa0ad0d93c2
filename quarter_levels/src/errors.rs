use thiserror::Error;

use crate::catalog::AnalysisMode;

/// The unified error type for the `quarter_levels` crate.
///
/// Sparse data (dropped rows, quarters without a Friday, too few paired returns)
/// is never reported here; those cases degrade to empty or neutral results.
#[derive(Debug, Error)]
pub enum Error {
    /// The benchmark's own level catalog entry is missing, so nothing can be rescaled.
    #[error("benchmark levels unavailable: no catalog entry for {benchmark}")]
    BenchmarkUnavailable {
        /// Benchmark identifier that was looked up (e.g., "SPX").
        benchmark: String,
    },

    /// Beta mode was asked to rescale levels without the benchmark's bar series.
    #[error("beta mode for {symbol} requires {benchmark} bars")]
    BenchmarkBarsMissing {
        /// Asset being analyzed.
        symbol: String,
        /// Benchmark whose bars are missing.
        benchmark: String,
    },

    /// No catalog entry exists for the requested symbol in the catalog serving `mode`.
    #[error("symbol not found: {symbol} ({mode} catalog)")]
    SymbolNotFound {
        /// Symbol after alias resolution.
        symbol: String,
        /// Analysis mode whose catalog was searched.
        mode: AnalysisMode,
    },

    /// A level catalog failed normalization.
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// An error related to engine configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A generic I/O error.
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    /// A JSON document (bars or catalog) failed to parse.
    #[error("JSON parse failed")]
    Json(#[from] serde_json::Error),

    /// A TOML document failed to parse.
    #[error("TOML parse failed")]
    Toml(#[from] toml::de::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
