//! Integration tests for the batch pipeline: load, evaluate, persist.

use std::io::Write;

use proptest::prelude::*;

use barwise_core::{IndicatorConfig, IndicatorKind, IndicatorResult};
use barwise_runner::{
    generate_synthetic_bars, load_bars, run_batch, save_report, BatchConfig, BatchReport,
};

const ONE_MINUTE: i64 = 60_000;

fn all_defaults(parallel: bool) -> BatchConfig {
    BatchConfig {
        parallel,
        indicators: IndicatorKind::ALL
            .iter()
            .map(|&kind| IndicatorConfig::defaults(kind))
            .collect(),
    }
}

/// NaN-safe comparison of entry rows.
fn rows_json(report: &BatchReport) -> Vec<String> {
    report
        .entries
        .iter()
        .map(|e| serde_json::to_string(&e.rows).unwrap())
        .collect()
}

#[test]
fn parallel_and_sequential_runs_agree() {
    let bars = generate_synthetic_bars("AGREE", 3_000, ONE_MINUTE);
    let seq = run_batch(&bars, &all_defaults(false)).unwrap();
    let par = run_batch(&bars, &all_defaults(true)).unwrap();

    assert_eq!(rows_json(&seq), rows_json(&par));
    assert_eq!(seq.dataset_hash, par.dataset_hash);
    assert_ne!(
        seq.config_hash, par.config_hash,
        "the parallel flag is part of the config"
    );
}

#[test]
fn entries_follow_config_order() {
    let bars = generate_synthetic_bars("ORDER", 200, ONE_MINUTE);
    let config = BatchConfig {
        parallel: true,
        indicators: vec![
            IndicatorConfig::positional("ema", &[5.0]),
            IndicatorConfig::positional("MACD", &[3.0, 6.0, 2.0]),
            IndicatorConfig::positional("rsi", &[7.0]),
            IndicatorConfig::positional("ma", &[5.0]),
        ],
    };
    let report = run_batch(&bars, &config).unwrap();

    let kinds: Vec<&str> = report.entries.iter().map(|e| e.kind.as_str()).collect();
    assert_eq!(kinds, ["ema", "macd", "rsi", "ma"]);
    assert_eq!(report.entries[0].name, "ema_5");
    assert_eq!(report.entries[2].lookback, 7);
}

#[test]
fn every_entry_is_aligned_to_the_bars() {
    let bars = generate_synthetic_bars("ALIGN", 500, ONE_MINUTE);
    let report = run_batch(&bars, &all_defaults(false)).unwrap();

    assert_eq!(report.bar_count, 500);
    for entry in &report.entries {
        assert_eq!(entry.rows.len(), bars.len(), "{}", entry.name);
        for (row, bar) in entry.rows.iter().zip(&bars) {
            assert_eq!(row.timestamp(), bar.timestamp);
        }
    }
}

#[test]
fn csv_bars_through_batch_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let bars_path = dir.path().join("bars.csv");
    let mut file = std::fs::File::create(&bars_path).unwrap();
    writeln!(file, "timestamp,open,high,low,close,volume").unwrap();
    for bar in generate_synthetic_bars("DISK", 60, ONE_MINUTE) {
        writeln!(
            file,
            "{},{},{},{},{},{}",
            bar.timestamp, bar.open, bar.high, bar.low, bar.close, bar.volume
        )
        .unwrap();
    }
    drop(file);

    let bars = load_bars(&bars_path, None).unwrap();
    let config = BatchConfig::from_toml_str(
        r#"
[[indicators]]
name = "rsi"
params = [14]

[[indicators]]
name = "poc"
params = { value_area_pct = 0.7, bucket_size = 0.5 }
"#,
    )
    .unwrap();
    let report = run_batch(&bars, &config).unwrap();

    let out = dir.path().join("out");
    let report_path = save_report(&report, &out).unwrap();
    assert_eq!(report_path, out.join("report.json"));

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(saved["schema_version"], 1);
    assert_eq!(saved["bar_count"], 60);
    assert_eq!(saved["entries"][0]["name"], "rsi_14");
    assert!(saved["entries"][0]["rows"][0]["rsi"].is_null());

    let rsi_csv = std::fs::read_to_string(out.join("rsi_14.csv")).unwrap();
    let mut lines = rsi_csv.lines();
    assert_eq!(lines.next(), Some("timestamp,rsi"));
    assert_eq!(lines.count(), 60);

    let poc_csv = std::fs::read_to_string(out.join("poc_0.7.csv")).unwrap();
    assert!(poc_csv.starts_with("timestamp,poc,vah,val\n"));
}

#[test]
fn invalid_params_fail_the_whole_batch() {
    let bars = generate_synthetic_bars("INVALID", 50, ONE_MINUTE);
    let config = BatchConfig {
        parallel: true,
        indicators: vec![
            IndicatorConfig::defaults(IndicatorKind::Rsi),
            IndicatorConfig::positional("macd", &[12.0, 0.0, 9.0]),
        ],
    };
    let err = run_batch(&bars, &config).unwrap_err();
    assert!(err.to_string().contains("indicator #1"), "{err}");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn parallelism_never_changes_results(label in "[A-Z]{3,6}", n in 0usize..400) {
        let bars = generate_synthetic_bars(&label, n, ONE_MINUTE);
        let seq = run_batch(&bars, &all_defaults(false)).unwrap();
        let par = run_batch(&bars, &all_defaults(true)).unwrap();
        prop_assert_eq!(rows_json(&seq), rows_json(&par));
    }
}
