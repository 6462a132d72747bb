// =============================================================================
// Spectra: Command-line Entry Point
// =============================================================================
//
// Reads JSON arrays of price bars, runs the spectral and indicator engines and
// prints JSON (or CSV for `export`). Several input files are processed in
// parallel on tokio's blocking pool; the engines are shared read-only.
// =============================================================================

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use spectra_engine::export::{self, ExportFormat};
use spectra_engine::spectral::{cycle_phase, detect_regime_change};
use spectra_engine::{EngineConfig, IndicatorEngine, PriceBar, SpectralEngine, TimeSeriesSample};

const DEFAULT_CONFIG_PATH: &str = "spectra_config.json";

#[derive(Debug, Parser)]
#[command(name = "spectra", version, about = "Spectral decomposition and technical indicators")]
struct Cli {
    /// Engine config file (JSON). Falls back to $SPECTRA_CONFIG, then
    /// `spectra_config.json`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Decompose the trailing window of each file.
    Spectrum {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Compute the indicator basket for each file.
    Indicators {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Project the dominant cycles forward.
    Project {
        file: PathBuf,
        #[arg(long, default_value_t = 10)]
        horizon: usize,
    },
    /// Compare the trailing spectra of two files for a cycle regime shift.
    Regime { previous: PathBuf, current: PathBuf },
    /// Write bars (and optionally indicators) as CSV or JSON.
    Export {
        file: PathBuf,
        #[arg(long, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
        #[arg(long)]
        no_indicators: bool,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

/// Engines built once from the resolved configuration.
struct Engines {
    spectral: SpectralEngine,
    indicators: IndicatorEngine,
    regime_threshold: f64,
}

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Environment & logging ─────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // ── 2. Config ────────────────────────────────────────────────────────
    let config = resolve_config(cli.config.as_deref())?;
    let engines = Arc::new(Engines {
        spectral: SpectralEngine::new(config.spectral.clone())?,
        indicators: IndicatorEngine::new(config.indicators.clone())?,
        regime_threshold: config.regime_change_threshold,
    });

    info!(
        window_size = engines.spectral.window_size(),
        period = engines.indicators.period(),
        "Engines ready"
    );

    // ── 3. Dispatch ──────────────────────────────────────────────────────
    match cli.command {
        Command::Spectrum { files } => {
            let results = run_per_file(files, engines, spectrum_for_file).await?;
            print_json(&Value::Array(results))?;
        }
        Command::Indicators { files } => {
            let results = run_per_file(files, engines, indicators_for_file).await?;
            print_json(&Value::Array(results))?;
        }
        Command::Project { file, horizon } => {
            let result = tokio::task::spawn_blocking(move || project_file(&engines, &file, horizon))
                .await
                .context("projection task panicked")??;
            print_json(&result)?;
        }
        Command::Regime { previous, current } => {
            let result =
                tokio::task::spawn_blocking(move || regime_between(&engines, &previous, &current))
                    .await
                    .context("regime task panicked")??;
            print_json(&result)?;
        }
        Command::Export {
            file,
            format,
            no_indicators,
            out,
        } => {
            let rendered = tokio::task::spawn_blocking(move || {
                export_file(&engines, &file, format, !no_indicators)
            })
            .await
            .context("export task panicked")??;

            match out {
                Some(path) => {
                    std::fs::write(&path, rendered)
                        .with_context(|| format!("failed to write export to {}", path.display()))?;
                    info!(path = %path.display(), %format, "Export written");
                }
                None => println!("{rendered}"),
            }
        }
    }

    Ok(())
}

// =============================================================================
// Configuration
// =============================================================================

/// Load the config file and apply env overrides.
///
/// `--config` wins over `$SPECTRA_CONFIG`; either one must point at a valid
/// file. Defaults are used only when neither is set and `spectra_config.json`
/// does not exist.
fn resolve_config(cli_path: Option<&Path>) -> Result<EngineConfig> {
    let explicit = cli_path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os("SPECTRA_CONFIG").map(PathBuf::from));

    let mut config = EngineConfig::load_or_default(explicit.as_deref(), DEFAULT_CONFIG_PATH)?;

    if let Some(window_size) = env_override("SPECTRA_WINDOW_SIZE") {
        config.spectral.window_size = window_size;
    }
    if let Some(period) = env_override("SPECTRA_PERIOD") {
        config.indicators.period = period;
    }

    config.validate().context("invalid engine configuration")?;
    Ok(config)
}

fn env_override(key: &str) -> Option<usize> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse::<usize>() {
        Ok(v) => {
            info!(key, value = v, "Config override from environment");
            Some(v)
        }
        Err(e) => {
            warn!(key, value = %raw, error = %e, "Ignoring unparsable override");
            None
        }
    }
}

// =============================================================================
// Per-file work
// =============================================================================

fn read_bars(path: &Path) -> Result<Vec<PriceBar>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read bars from {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse bars from {}", path.display()))
}

fn samples(bars: &[PriceBar]) -> Vec<TimeSeriesSample> {
    bars.iter().map(PriceBar::sample).collect()
}

fn spectrum_for_file(engines: &Engines, path: &Path) -> Result<Value> {
    let bars = read_bars(path)?;
    let result = engines
        .spectral
        .analyze_trailing(&samples(&bars))
        .with_context(|| format!("spectral analysis failed for {}", path.display()))?;
    Ok(json!({ "file": path.display().to_string(), "spectrum": result }))
}

fn indicators_for_file(engines: &Engines, path: &Path) -> Result<Value> {
    let bars = read_bars(path)?;
    let result = engines.indicators.compute(&bars);
    if result.is_none() {
        info!(
            file = %path.display(),
            bars = bars.len(),
            period = engines.indicators.period(),
            "Not enough bars for indicators"
        );
    }
    Ok(json!({ "file": path.display().to_string(), "indicators": result }))
}

fn project_file(engines: &Engines, path: &Path, horizon: usize) -> Result<Value> {
    let bars = read_bars(path)?;
    let samples = samples(&bars);
    let result = engines
        .spectral
        .analyze_trailing(&samples)
        .with_context(|| format!("spectral analysis failed for {}", path.display()))?;

    let last_timestamp = samples.last().map(|s| s.timestamp).unwrap_or_default();
    let offsets = engines.spectral.predict_offsets(
        last_timestamp,
        &result.dominant_frequencies,
        &result.dominant_phases(),
        horizon,
    )?;

    Ok(json!({
        "file": path.display().to_string(),
        "last_timestamp": last_timestamp,
        "dominant_frequencies": result.dominant_frequencies,
        "offsets": offsets,
        "cycle_phase": cycle_phase(&result, last_timestamp),
    }))
}

fn regime_between(engines: &Engines, previous: &Path, current: &Path) -> Result<Value> {
    let analyze = |path: &Path| -> Result<_> {
        let bars = read_bars(path)?;
        engines
            .spectral
            .analyze_trailing(&samples(&bars))
            .with_context(|| format!("spectral analysis failed for {}", path.display()))
    };
    let before = analyze(previous)?;
    let after = analyze(current)?;
    let shift = detect_regime_change(&before, &after, engines.regime_threshold);

    Ok(json!({
        "previous": previous.display().to_string(),
        "current": current.display().to_string(),
        "threshold": engines.regime_threshold,
        "regime": shift,
    }))
}

fn export_file(
    engines: &Engines,
    path: &Path,
    format: ExportFormat,
    include_indicators: bool,
) -> Result<String> {
    let bars = read_bars(path)?;
    let indicators = if include_indicators {
        let computed = engines.indicators.compute(&bars);
        if computed.is_none() {
            info!(file = %path.display(), "Not enough bars, exporting without indicators");
        }
        computed
    } else {
        None
    };
    export::render(&bars, indicators.as_ref(), format)
}

/// Run `work` for every file on the blocking pool and collect results in
/// input order.
async fn run_per_file<F>(files: Vec<PathBuf>, engines: Arc<Engines>, work: F) -> Result<Vec<Value>>
where
    F: Fn(&Engines, &Path) -> Result<Value> + Copy + Send + 'static,
{
    let handles: Vec<_> = files
        .into_iter()
        .map(|file| {
            let engines = engines.clone();
            tokio::task::spawn_blocking(move || work(&engines, &file))
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        results.push(handle.await.context("worker task panicked")??);
    }
    Ok(results)
}

fn print_json(value: &Value) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to serialise output")?;
    println!("{text}");
    Ok(())
}
