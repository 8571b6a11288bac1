//! Barwise CLI: compute, batch and describe commands.
//!
//! Commands:
//! - `compute`: run one indicator over a bar file and print or save the rows
//! - `batch`: run every indicator in a TOML config and save a report directory
//! - `describe`: print an indicator's purpose, parameters and output fields
//!
//! `--synthetic <n>` replaces `--bars` with deterministic generated bars.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use barwise_core::{build, Bar, Indicator, IndicatorConfig, IndicatorKind};
use barwise_runner::{
    generate_synthetic_bars, load_bars, render, run_batch, save_report, BatchConfig, OutputFormat,
};

const SYNTHETIC_INTERVAL_MS: i64 = 60_000;

#[derive(Parser)]
#[command(
    name = "barwise",
    about = "Barwise CLI: timestamp-aligned technical indicators"
)]
struct Cli {
    /// Use this many synthetic one-minute bars instead of --bars.
    #[arg(long, global = true)]
    synthetic: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute one indicator over a bar file.
    Compute {
        /// Bar file (.csv or .json).
        #[arg(long)]
        bars: Option<PathBuf>,

        /// Indicator name: macd, rsi, atr, cci, ma, ema, poc.
        #[arg(long)]
        indicator: String,

        /// Comma-separated positional parameters (e.g. "12,26,9"), or a JSON
        /// object for poc (e.g. '{"value_area_pct":0.7,"bucket_size":0.5}').
        #[arg(long)]
        params: Option<String>,

        /// Output format.
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,

        /// Write to this file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Run every indicator in a TOML batch config.
    Batch {
        /// Bar file (.csv or .json).
        #[arg(long)]
        bars: Option<PathBuf>,

        /// Path to the TOML batch config.
        #[arg(long)]
        config: PathBuf,

        /// Output directory for report.json and per-indicator CSVs.
        #[arg(long, default_value = "results")]
        output: PathBuf,
    },
    /// Describe an indicator with its default parameters.
    Describe {
        /// Indicator name: macd, rsi, atr, cci, ma, ema, poc.
        name: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Csv,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Json => OutputFormat::Json,
            Format::Csv => OutputFormat::Csv,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compute {
            bars,
            indicator,
            params,
            format,
            output,
        } => run_compute(
            bars.as_deref(),
            cli.synthetic,
            &indicator,
            params.as_deref(),
            format,
            output.as_deref(),
        ),
        Commands::Batch {
            bars,
            config,
            output,
        } => run_batch_cmd(bars.as_deref(), cli.synthetic, &config, &output),
        Commands::Describe { name } => run_describe(&name),
    }
}

fn resolve_bars(path: Option<&Path>, synthetic: Option<usize>) -> Result<Vec<Bar>> {
    match (path, synthetic) {
        (Some(_), Some(_)) => bail!("--bars and --synthetic are mutually exclusive"),
        (None, None) => bail!("one of --bars or --synthetic is required"),
        (Some(path), None) => {
            load_bars(path, None).with_context(|| format!("loading {}", path.display()))
        }
        (None, Some(n)) => {
            tracing::warn!(bars = n, "using synthetic bars");
            Ok(generate_synthetic_bars("barwise", n, SYNTHETIC_INTERVAL_MS))
        }
    }
}

/// Positional numbers ("12,26,9") or a JSON value for keyed parameters.
fn parse_params(raw: Option<&str>) -> Result<Value> {
    let Some(raw) = raw.map(str::trim) else {
        return Ok(Value::Null);
    };
    if raw.starts_with('{') || raw.starts_with('[') {
        return serde_json::from_str(raw).context("parsing --params as JSON");
    }
    raw.split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .with_context(|| format!("invalid parameter '{part}'"))
        })
        .collect::<Result<Vec<_>>>()
        .map(Value::from)
}

fn run_compute(
    bars_path: Option<&Path>,
    synthetic: Option<usize>,
    name: &str,
    params: Option<&str>,
    format: Format,
    output: Option<&Path>,
) -> Result<()> {
    let config = IndicatorConfig::new(name, parse_params(params)?);
    let indicator = build(&config)?;
    let bars = resolve_bars(bars_path, synthetic)?;

    let rows = indicator.scoped().on_bars(&bars)?;
    let rendered = render(&rows, format.into())?;

    match output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("writing {}", path.display()))?;
            tracing::info!(
                indicator = indicator.name(),
                rows = rows.len(),
                path = %path.display(),
                "results written"
            );
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

fn run_batch_cmd(
    bars_path: Option<&Path>,
    synthetic: Option<usize>,
    config_path: &Path,
    output_dir: &Path,
) -> Result<()> {
    let config = BatchConfig::load(config_path)?;
    let bars = resolve_bars(bars_path, synthetic)?;

    let report = run_batch(&bars, &config)?;
    for entry in &report.entries {
        let warm = entry.rows.iter().filter(|r| r.is_warm()).count();
        println!(
            "{:<20} lookback {:>4}  {warm}/{} rows defined",
            entry.name,
            entry.lookback,
            entry.rows.len()
        );
    }

    let report_path = save_report(&report, output_dir)?;
    println!("Report saved to: {}", report_path.display());
    Ok(())
}

fn run_describe(name: &str) -> Result<()> {
    let kind: IndicatorKind = name.parse()?;
    let indicator = build(&IndicatorConfig::defaults(kind))?;

    println!("{} (v{})", indicator.name(), indicator.version());
    println!("  purpose:  {}", indicator.describe_purpose());
    println!("  params:   {}", indicator.describe_params());
    println!("  output:   {}", indicator.describe_output());
    println!("  lookback: {}", indicator.lookback());
    if !kind.positional_params().is_empty() {
        println!("  positional order: {}", kind.positional_params().join(","));
    }
    Ok(())
}
