//! Nystagmus Analyzer - batch gaze-trace analysis
//!
//! Analyzes one or more CSV gaze recordings and prints a text report for
//! each. Recordings are processed in parallel.
//!
//! # Usage
//!
//! ```bash
//! # Analyze with built-in defaults
//! nystagmus-analyzer session1.csv session2.csv
//!
//! # Custom config, frame rate override, JSON reports
//! nystagmus-analyzer --config lab.toml --fps 120 --json out/ session.csv
//! ```
//!
//! # Environment Variables
//!
//! - `NYSTAGMUS_CONFIG`: Path to a TOML config (used when `--config` is absent)
//! - `RUST_LOG`: Logging level (default: info)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;
use tracing::{error, info};

use nystagmus_analyzer::config::{self, AnalysisConfig, PresetSelection};
use nystagmus_analyzer::report::format_session_report;
use nystagmus_analyzer::{SessionAnalyzer, SessionReport};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "nystagmus-analyzer")]
#[command(about = "Nystagmus gaze-trace characterization and predictor error analysis")]
#[command(version)]
struct CliArgs {
    /// CSV recordings to analyze
    #[arg(required = true, value_name = "FILE")]
    files: Vec<PathBuf>,

    /// TOML config file (overrides NYSTAGMUS_CONFIG and ./nystagmus.toml)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Override the recording frame rate (Hz)
    #[arg(long)]
    fps: Option<f64>,

    /// Frequency preset: auto, planar or horizontal
    #[arg(long)]
    preset: Option<PresetSelection>,

    /// Write one JSON report per recording into this directory
    #[arg(long, value_name = "DIR")]
    json: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, env = "NYSTAGMUS_LOG_JSON")]
    log_json: bool,
}

// ============================================================================
// Helpers
// ============================================================================

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // Reports go to stdout, logs to stderr
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn build_config(args: &CliArgs) -> Result<AnalysisConfig> {
    let mut cfg = match &args.config {
        Some(path) => AnalysisConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AnalysisConfig::load(),
    };

    if let Some(fps) = args.fps {
        cfg.sampling.fps = fps;
    }
    if let Some(preset) = args.preset {
        cfg.frequency.preset = preset;
    }
    cfg.validate().context("Invalid configuration after CLI overrides")?;
    Ok(cfg)
}

fn write_json(dir: &Path, source: &Path, report: &SessionReport) -> Result<PathBuf> {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("report");
    let out = dir.join(format!("{stem}.json"));
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    std::fs::write(&out, json).with_context(|| format!("Failed to write {}", out.display()))?;
    Ok(out)
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.log_json);

    config::init(build_config(&args)?);
    let cfg = config::get();

    info!(
        files = args.files.len(),
        fps = cfg.sampling.fps,
        "Nystagmus Analyzer starting"
    );

    if let Some(dir) = &args.json {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let analyzer = SessionAnalyzer::new(cfg);
    let results: Vec<(PathBuf, Result<SessionReport>)> = args
        .files
        .par_iter()
        .map(|path| {
            let report = analyzer
                .analyze_file(path)
                .with_context(|| format!("Failed to analyze {}", path.display()));
            (path.clone(), report)
        })
        .collect();

    let mut failed = 0usize;
    for (path, result) in results {
        match result {
            Ok(report) => {
                println!("{}", format_session_report(&report));
                if let Some(dir) = &args.json {
                    let out = write_json(dir, &path, &report)?;
                    info!(path = %out.display(), "JSON report written");
                }
            }
            Err(e) => {
                error!("{:#}", e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Err(anyhow::anyhow!(
            "{} of {} recordings failed",
            failed,
            args.files.len()
        ));
    }
    Ok(())
}
