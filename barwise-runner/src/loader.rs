//! Bar loading for the runner.
//!
//! Two file formats:
//! - **CSV** with a header row. Required columns: `timestamp` (or `open_time`,
//!   as exchange kline dumps name it), `open`, `high`, `low`, `close`,
//!   `volume`. `is_close` is optional; an empty cell means finalized.
//! - **JSON**: an array of rows, each positional or keyed (see
//!   [`BarRow`](barwise_core::BarRow)).
//!
//! Both formats go through the core row schema, so the same rules (numeric
//! strings accepted, integral timestamps, row index in errors) apply.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use barwise_core::{parse_rows, Bar, BarRow, SchemaError};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors from the loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV header is missing column '{0}'")]
    MissingColumn(&'static str),

    #[error("cannot infer bar format from '{0}' (expected .csv or .json)")]
    UnknownFormat(PathBuf),

    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),
}

/// On-disk bar formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarFormat {
    Csv,
    Json,
}

impl BarFormat {
    /// Infer the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("csv") => Ok(BarFormat::Csv),
            Some("json") => Ok(BarFormat::Json),
            _ => Err(LoadError::UnknownFormat(path.to_path_buf())),
        }
    }
}

/// Load bars from a file. `format` overrides extension-based detection.
pub fn load_bars(path: &Path, format: Option<BarFormat>) -> Result<Vec<Bar>, LoadError> {
    let format = match format {
        Some(f) => f,
        None => BarFormat::from_path(path)?,
    };
    let io_err = |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut file = File::open(path).map_err(io_err)?;

    let bars = match format {
        BarFormat::Csv => parse_csv(file)?,
        BarFormat::Json => {
            let mut text = String::new();
            file.read_to_string(&mut text).map_err(io_err)?;
            parse_json(&text)?
        }
    };

    let suspect = bars.iter().filter(|b| !b.is_sane()).count();
    if suspect > 0 {
        tracing::warn!(path = %path.display(), suspect, "bars with inconsistent OHLCV");
    }
    tracing::info!(path = %path.display(), bars = bars.len(), "loaded bars");
    Ok(bars)
}

/// Parse a JSON array of rows.
pub fn parse_json(text: &str) -> Result<Vec<Bar>, LoadError> {
    let rows: Vec<BarRow> = serde_json::from_str(text)?;
    Ok(parse_rows(&rows)?)
}

/// Parse CSV with a header row into bars.
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<Bar>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = CsvColumns::from_headers(rdr.headers()?)?;
    let mut rows = Vec::new();
    for record in rdr.records() {
        rows.push(columns.row(&record?));
    }
    Ok(parse_rows(&rows)?)
}

/// Position of each bar field in the CSV header.
struct CsvColumns {
    positions: Vec<(&'static str, usize)>,
}

impl CsvColumns {
    const REQUIRED: [&'static str; 5] = ["open", "high", "low", "close", "volume"];

    fn from_headers(headers: &csv::StringRecord) -> Result<Self, LoadError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
        };

        let timestamp = find("timestamp")
            .or_else(|| find("open_time"))
            .ok_or(LoadError::MissingColumn("timestamp"))?;
        let mut positions = vec![("timestamp", timestamp)];
        for name in Self::REQUIRED {
            positions.push((name, find(name).ok_or(LoadError::MissingColumn(name))?));
        }
        if let Some(flag) = find("is_close") {
            positions.push(("is_close", flag));
        }
        Ok(Self { positions })
    }

    /// Keyed row with raw string cells; the core schema does the conversion.
    /// Missing and empty cells are left out so the schema reports them (or,
    /// for `is_close`, applies the default).
    fn row(&self, record: &csv::StringRecord) -> BarRow {
        let mut map = Map::new();
        for &(name, position) in &self.positions {
            match record.get(position) {
                Some(cell) if !cell.is_empty() => {
                    map.insert(name.to_string(), Value::String(cell.to_string()));
                }
                _ => {}
            }
        }
        BarRow::Keyed(map)
    }
}

/// Deterministic BLAKE3 hash over every bar field, in order.
pub fn dataset_hash(bars: &[Bar]) -> String {
    let mut hasher = blake3::Hasher::new();
    for bar in bars {
        hasher.update(&bar.timestamp.to_le_bytes());
        hasher.update(&bar.open.to_le_bytes());
        hasher.update(&bar.high.to_le_bytes());
        hasher.update(&bar.low.to_le_bytes());
        hasher.update(&bar.close.to_le_bytes());
        hasher.update(&bar.volume.to_le_bytes());
        hasher.update(&[u8::from(bar.is_close)]);
    }
    hasher.finalize().to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use barwise_core::SchemaErrorKind;
    use std::io::Write;

    const CSV: &str = "\
open_time,open,high,low,close,volume,is_close
1704153600000,100.0,101.5,99.5,101.0,1200,true
1704153660000,101.0,102.0,100.0,100.5,800,
1704153720000,100.5,100.9,99.8,100.2,950,0
";

    #[test]
    fn csv_with_open_time_header() {
        let bars = parse_csv(CSV.as_bytes()).unwrap();
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].timestamp, 1_704_153_600_000);
        assert_eq!(bars[0].close, 101.0);
        assert!(bars[1].is_close, "empty is_close cell defaults to finalized");
        assert!(!bars[2].is_close);
    }

    #[test]
    fn csv_without_is_close_column() {
        let text = "timestamp,open,high,low,close,volume\n1,1,2,0.5,1.5,10\n";
        let bars = parse_csv(text.as_bytes()).unwrap();
        assert_eq!(bars, vec![Bar::new(1, 1.0, 2.0, 0.5, 1.5, 10.0)]);
    }

    #[test]
    fn csv_missing_column_is_reported() {
        let text = "timestamp,open,high,low,volume\n1,1,2,0.5,10\n";
        let err = parse_csv(text.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn("close")));
    }

    #[test]
    fn csv_empty_close_cell_is_schema_error_with_row_index() {
        let text = "timestamp,open,high,low,close,volume\n1,1,2,0.5,1.5,10\n2,1,2,0.5,,10\n";
        match parse_csv(text.as_bytes()).unwrap_err() {
            LoadError::Schema(e) => {
                assert_eq!(e.index, 1);
                assert_eq!(e.kind, SchemaErrorKind::MissingField("close"));
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn json_accepts_both_row_shapes() {
        let text = r#"[
            [1, "1.0", "2.0", "0.5", "1.5", "10", false],
            {"timestamp": 2, "open": 1.5, "high": 2.5, "low": 1.0, "close": 2.0, "volume": 12}
        ]"#;
        let bars = parse_json(text).unwrap();
        assert_eq!(bars.len(), 2);
        assert!(!bars[0].is_close);
        assert_eq!(bars[1].close, 2.0);
    }

    #[test]
    fn load_bars_detects_format_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bars.CSV");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(CSV.as_bytes())
            .unwrap();
        assert_eq!(load_bars(&path, None).unwrap().len(), 3);

        let unknown = dir.path().join("bars.txt");
        assert!(matches!(
            load_bars(&unknown, None),
            Err(LoadError::UnknownFormat(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_bars(Path::new("/nonexistent/bars.json"), None).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn dataset_hash_is_deterministic_and_sensitive() {
        let mut bars = parse_csv(CSV.as_bytes()).unwrap();
        let h1 = dataset_hash(&bars);
        assert_eq!(h1, dataset_hash(&bars));
        assert_eq!(h1.len(), 64);
        bars[2].close += 0.01;
        assert_ne!(h1, dataset_hash(&bars));
    }
}
