use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use quarter_levels::{
    aggregate::to_weekly,
    catalog::{AnalysisMode, CatalogSet, load_catalog_path},
    config::{EngineConfig, load_config_path},
    models::{bar::Bar, outcome::OutcomeKey},
    normalize::normalize_json,
    pipeline::{AnalysisRequest, LevelEngine},
    scaler::scale_levels,
};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

#[derive(Parser)]
#[command(version, about = "Quarter range levels CLI")]
struct Cli {
    /// Engine config (TOML); defaults apply when omitted.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Detect ranges, classify them, and map levels.
    Analyze(AnalyzeCmd),
    /// Rescale the benchmark's levels for an asset.
    Scale(ScaleCmd),
    /// Aggregate daily bars into weekly bars.
    Weekly(WeeklyCmd),
}

#[derive(Args)]
struct AnalyzeCmd {
    #[arg(long, value_name = "FILE")]
    bars: Option<PathBuf>,
    #[arg(long, value_name = "FILE")]
    benchmark_bars: Option<PathBuf>,
    /// Directory of `<SYMBOL>.json` bar files, named through `bar_aliases`.
    #[arg(long, value_name = "DIR")]
    bars_dir: Option<PathBuf>,
    /// Full ("pro") level catalog.
    #[arg(long, value_name = "FILE")]
    catalog: PathBuf,
    /// Basic level catalog for simple mode.
    #[arg(long, value_name = "FILE")]
    simple_catalog: Option<PathBuf>,
    #[arg(long)]
    symbol: String,
    #[arg(long, default_value = "pro")]
    mode: AnalysisMode,
    #[arg(long, default_value = "auto")]
    outcome: OutcomeKey,
}

#[derive(Args)]
struct ScaleCmd {
    #[arg(long, value_name = "FILE")]
    asset_bars: Option<PathBuf>,
    #[arg(long, value_name = "FILE")]
    benchmark_bars: Option<PathBuf>,
    /// Directory of `<SYMBOL>.json` bar files, named through `bar_aliases`.
    #[arg(long, value_name = "DIR")]
    bars_dir: Option<PathBuf>,
    #[arg(long, value_name = "FILE")]
    catalog: PathBuf,
    #[arg(long)]
    symbol: String,
}

#[derive(Args)]
struct WeeklyCmd {
    #[arg(long, value_name = "FILE")]
    bars: PathBuf,
    /// IANA zone; defaults to the config's week_time_zone.
    #[arg(long)]
    tz: Option<String>,
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init()
}

fn read_bars(path: &Path) -> Result<Vec<Bar>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read bars file {}", path.display()))?;
    normalize_json(&text).with_context(|| format!("parse bars file {}", path.display()))
}

/// An explicit file wins; otherwise the catalog key's file under `dir`.
fn bars_path(
    explicit: Option<&Path>,
    dir: Option<&Path>,
    catalog_key: &str,
    config: &EngineConfig,
) -> Result<PathBuf> {
    match (explicit, dir) {
        (Some(p), _) => Ok(p.to_path_buf()),
        (None, Some(dir)) => Ok(config.bar_file(dir, catalog_key)),
        (None, None) => bail!("no bar file for {catalog_key}: pass a file or --bars-dir"),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(p) => load_config_path(p).with_context(|| format!("load config {}", p.display()))?,
        None => EngineConfig::default(),
    };

    match cli.cmd {
        Cmd::Analyze(cmd) => {
            let dir = cmd.bars_dir.as_deref();
            let asset_key = config.level_symbol(&cmd.symbol);
            let bars = read_bars(&bars_path(cmd.bars.as_deref(), dir, &asset_key, &config)?)?;
            let benchmark_bars = match (&cmd.benchmark_bars, dir) {
                (Some(p), _) => Some(read_bars(p)?),
                (None, Some(dir)) if cmd.mode == AnalysisMode::Beta && asset_key != config.benchmark => {
                    Some(read_bars(&config.bar_file(dir, &config.benchmark))?)
                }
                _ => None,
            };
            let catalogs = CatalogSet {
                pro: load_catalog_path(&cmd.catalog)
                    .with_context(|| format!("load catalog {}", cmd.catalog.display()))?,
                simple: match &cmd.simple_catalog {
                    Some(p) => load_catalog_path(p)
                        .with_context(|| format!("load catalog {}", p.display()))?,
                    None => Default::default(),
                },
            };

            let engine = LevelEngine::new(config, catalogs);
            let request = AnalysisRequest {
                symbol: cmd.symbol,
                mode: cmd.mode,
                outcome: cmd.outcome,
            };
            let result = engine.analyze(&request, &bars, benchmark_bars.as_deref())?;
            print_json(&result)?;
        }
        Cmd::Scale(cmd) => {
            let dir = cmd.bars_dir.as_deref();
            let asset_key = config.level_symbol(&cmd.symbol);
            let asset = read_bars(&bars_path(cmd.asset_bars.as_deref(), dir, &asset_key, &config)?)?;
            let benchmark = read_bars(&bars_path(
                cmd.benchmark_bars.as_deref(),
                dir,
                &config.benchmark,
                &config,
            )?)?;
            let catalog = load_catalog_path(&cmd.catalog)
                .with_context(|| format!("load catalog {}", cmd.catalog.display()))?;
            let scaled = scale_levels(
                &cmd.symbol,
                &asset,
                &benchmark,
                catalog.get(&config.benchmark),
                &config,
            )?;
            print_json(&scaled.to_catalog_entry()?)?;
        }
        Cmd::Weekly(cmd) => {
            let bars = read_bars(&cmd.bars)?;
            let tz = cmd.tz.unwrap_or_else(|| config.week_time_zone.clone());
            print_json(&to_weekly(&bars, &tz)?)?;
        }
    }

    Ok(())
}
