//! Batch evaluation: many indicators over one bar set.
//!
//! Every indicator in the config is built before any computation starts, so a
//! bad entry fails the batch without partial output. Evaluation optionally
//! runs in parallel; results always come back in config order.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use barwise_core::{
    build, AnyIndicator, Bar, Indicator, IndicatorConfig, IndicatorError, IndicatorOutput,
    ValidationError,
};

use crate::export::rows_to_csv;
use crate::loader::dataset_hash;

/// Current schema version for persisted reports.
pub const SCHEMA_VERSION: u32 = 1;

/// Errors from batch configuration, evaluation and persistence.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("indicator #{index} ('{name}'): {source}")]
    Build {
        index: usize,
        name: String,
        #[source]
        source: ValidationError,
    },
    #[error("indicator '{name}' failed: {source}")]
    Indicator {
        name: String,
        #[source]
        source: IndicatorError,
    },
}

/// Batch configuration, usually loaded from TOML.
///
/// ```toml
/// parallel = true
///
/// [[indicators]]
/// name = "rsi"
/// params = [14]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    #[serde(default)]
    pub parallel: bool,
    #[serde(default)]
    pub indicators: Vec<IndicatorConfig>,
}

impl BatchConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, RunError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, RunError> {
        let text = fs::read_to_string(path).map_err(|source| RunError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Deterministic content hash of the configuration.
    pub fn config_hash(&self) -> Result<String, RunError> {
        let json = serde_json::to_string(self)?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }
}

/// One indicator's results within a batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchEntry {
    pub name: String,
    pub kind: String,
    pub lookback: usize,
    pub rows: Vec<IndicatorOutput>,
}

/// Full batch output.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub schema_version: u32,
    pub config_hash: String,
    pub dataset_hash: String,
    pub bar_count: usize,
    pub entries: Vec<BatchEntry>,
}

/// Build every configured indicator, then evaluate each over `bars`.
pub fn run_batch(bars: &[Bar], config: &BatchConfig) -> Result<BatchReport, RunError> {
    let indicators = config
        .indicators
        .iter()
        .enumerate()
        .map(|(index, cfg)| {
            build(cfg).map_err(|source| RunError::Build {
                index,
                name: cfg.name.clone(),
                source,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    tracing::info!(
        indicators = indicators.len(),
        bars = bars.len(),
        parallel = config.parallel,
        "running batch"
    );

    let entries = if config.parallel {
        indicators
            .par_iter()
            .map(|ind| evaluate(ind, bars))
            .collect::<Result<Vec<_>, _>>()?
    } else {
        indicators
            .iter()
            .map(|ind| evaluate(ind, bars))
            .collect::<Result<Vec<_>, _>>()?
    };

    Ok(BatchReport {
        schema_version: SCHEMA_VERSION,
        config_hash: config.config_hash()?,
        dataset_hash: dataset_hash(bars),
        bar_count: bars.len(),
        entries,
    })
}

fn evaluate(indicator: &AnyIndicator, bars: &[Bar]) -> Result<BatchEntry, RunError> {
    let scoped = indicator.scoped();
    let rows = scoped.on_bars(bars).map_err(|source| RunError::Indicator {
        name: indicator.name().to_string(),
        source,
    })?;
    tracing::debug!(indicator = indicator.name(), rows = rows.len(), "indicator evaluated");

    Ok(BatchEntry {
        name: indicator.name().to_string(),
        kind: indicator.kind().as_str().to_string(),
        lookback: indicator.lookback(),
        rows,
    })
}

/// Write `report.json` plus one `<name>.csv` per entry into `dir`.
///
/// Returns the path of the JSON report.
pub fn save_report(report: &BatchReport, dir: &Path) -> Result<PathBuf, RunError> {
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| RunError::Io { path, source }
    };

    fs::create_dir_all(dir).map_err(io_err(dir))?;

    for entry in &report.entries {
        let csv_path = dir.join(format!("{}.csv", entry.name));
        fs::write(&csv_path, rows_to_csv(&entry.rows)?).map_err(io_err(&csv_path))?;
    }

    let report_path = dir.join("report.json");
    let json = serde_json::to_string_pretty(report)?;
    fs::write(&report_path, json).map_err(io_err(&report_path))?;

    tracing::info!(path = %report_path.display(), entries = report.entries.len(), "report saved");
    Ok(report_path)
}
