//! Barwise Runner: loading, synthetic data and batch evaluation.
//!
//! This crate builds on `barwise-core` to provide:
//! - Bar loading from CSV and JSON files through the core row schema
//! - Deterministic synthetic bars for smoke runs
//! - Batch evaluation of many indicators over one bar set (optionally parallel)
//! - Result export to JSON and CSV, plus content hashes for reproducibility

pub mod batch;
pub mod export;
pub mod loader;
pub mod synthetic;

pub use batch::{run_batch, save_report, BatchConfig, BatchEntry, BatchReport, RunError};
pub use export::{render, rows_to_csv, rows_to_json, OutputFormat};
pub use loader::{dataset_hash, load_bars, parse_csv, parse_json, BarFormat, LoadError};
pub use synthetic::{generate_synthetic_bars, SYNTHETIC_START_MS};
