//! Untyped bar rows and their schema validation.
//!
//! Rows arrive either positionally, `[timestamp, open, high, low, close, volume, is_close]`,
//! or keyed by the same names. Numeric fields accept JSON numbers and numeric
//! strings (exchange kline payloads quote their prices). `is_close` is optional
//! and defaults to true.
//!
//! All rows are validated before any indicator computation starts, so a bad
//! row never produces partial output.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Bar;

/// Column names in positional order.
pub const BAR_FIELDS: [&str; 7] = [
    "timestamp",
    "open",
    "high",
    "low",
    "close",
    "volume",
    "is_close",
];

/// One raw input row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BarRow {
    Positional(Vec<Value>),
    Keyed(Map<String, Value>),
    /// Anything that is neither an array nor an object; always rejected.
    Other(Value),
}

impl From<Value> for BarRow {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(values) => BarRow::Positional(values),
            Value::Object(map) => BarRow::Keyed(map),
            other => BarRow::Other(other),
        }
    }
}

impl From<Bar> for BarRow {
    fn from(bar: Bar) -> Self {
        BarRow::Positional(vec![
            Value::from(bar.timestamp),
            Value::from(bar.open),
            Value::from(bar.high),
            Value::from(bar.low),
            Value::from(bar.close),
            Value::from(bar.volume),
            Value::from(bar.is_close),
        ])
    }
}

impl BarRow {
    fn field(&self, position: usize) -> Option<&Value> {
        match self {
            BarRow::Positional(values) => values.get(position),
            BarRow::Keyed(map) => map.get(BAR_FIELDS[position]),
            BarRow::Other(_) => None,
        }
    }
}

/// A row that does not satisfy the bar schema.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("bar {index}: {kind}")]
pub struct SchemaError {
    /// Position of the offending row in the input sequence.
    pub index: usize,
    pub kind: SchemaErrorKind,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaErrorKind {
    #[error("row must be an array or an object, got {0}")]
    NotARow(String),

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` is not numeric: {value}")]
    NotNumeric { field: &'static str, value: String },

    #[error("field `timestamp` is not an integer: {0}")]
    NotIntegral(String),

    #[error("field `is_close` is not a boolean: {0}")]
    NotBoolean(String),

    #[error("timestamp {0} is outside the representable date range")]
    TimestampOutOfRange(i64),
}

/// Validate and convert every row. Fails on the first offending row.
pub fn parse_rows(rows: &[BarRow]) -> Result<Vec<Bar>, SchemaError> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| parse_row(row).map_err(|kind| SchemaError { index, kind }))
        .collect()
}

fn parse_row(row: &BarRow) -> Result<Bar, SchemaErrorKind> {
    if let BarRow::Other(value) = row {
        return Err(SchemaErrorKind::NotARow(value.to_string()));
    }

    let required = |position: usize| {
        row.field(position)
            .ok_or(SchemaErrorKind::MissingField(BAR_FIELDS[position]))
    };
    let number = |position: usize| {
        let value = required(position)?;
        as_f64(value).ok_or_else(|| SchemaErrorKind::NotNumeric {
            field: BAR_FIELDS[position],
            value: value.to_string(),
        })
    };

    let raw_ts = required(0)?;
    let timestamp =
        as_timestamp(raw_ts).ok_or_else(|| SchemaErrorKind::NotIntegral(raw_ts.to_string()))?;

    let is_close = match row.field(6) {
        None | Some(Value::Null) => true,
        Some(value) => as_flag(value).ok_or_else(|| SchemaErrorKind::NotBoolean(value.to_string()))?,
    };

    Ok(Bar {
        timestamp,
        open: number(1)?,
        high: number(2)?,
        low: number(3)?,
        close: number(4)?,
        volume: number(5)?,
        is_close,
    })
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        // "NaN" and "inf" parse as f64 but are not prices.
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn as_timestamp(value: &Value) -> Option<i64> {
    if let Value::Number(n) = value {
        if let Some(ts) = n.as_i64() {
            return Some(ts);
        }
    }
    if let Value::String(s) = value {
        if let Ok(ts) = s.trim().parse::<i64>() {
            return Some(ts);
        }
    }
    // Integral floats such as `1.7e12` are accepted; fractional ones are not.
    let f = as_f64(value)?;
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn as_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> BarRow {
        BarRow::from(value)
    }

    #[test]
    fn positional_row_parses() {
        let bars = parse_rows(&[row(json!([1_000, 1.0, 2.0, 0.5, 1.5, 10.0, false]))]).unwrap();
        assert_eq!(bars[0], Bar {
            timestamp: 1_000,
            open: 1.0,
            high: 2.0,
            low: 0.5,
            close: 1.5,
            volume: 10.0,
            is_close: false,
        });
    }

    #[test]
    fn keyed_row_without_is_close_parses() {
        let bars = parse_rows(&[row(json!({
            "timestamp": 1_000, "open": 1.0, "high": 2.0, "low": 0.5, "close": 1.5, "volume": 10.0
        }))])
        .unwrap();
        assert!(bars[0].is_close);
        assert_eq!(bars[0].close, 1.5);
    }

    #[test]
    fn numeric_strings_are_accepted() {
        let bars = parse_rows(&[row(json!([
            "1499040000000", "0.0163", "0.8", "0.0157", "0.0158", "148976.1", 1
        ]))])
        .unwrap();
        assert_eq!(bars[0].timestamp, 1_499_040_000_000);
        assert_eq!(bars[0].open, 0.0163);
        assert!(bars[0].is_close);
    }

    #[test]
    fn missing_close_reports_row_index() {
        let rows = vec![
            row(json!({"timestamp": 1, "open": 1.0, "high": 1.0, "low": 1.0, "close": 1.0, "volume": 1.0})),
            row(json!({"timestamp": 2, "open": 1.0, "high": 1.0, "low": 1.0, "volume": 1.0})),
        ];
        let err = parse_rows(&rows).unwrap_err();
        assert_eq!(err.index, 1);
        assert_eq!(err.kind, SchemaErrorKind::MissingField("close"));
    }

    #[test]
    fn short_positional_row_is_missing_field() {
        let err = parse_rows(&[row(json!([1, 1.0, 1.0, 1.0, 1.0]))]).unwrap_err();
        assert_eq!(err.kind, SchemaErrorKind::MissingField("volume"));
    }

    #[test]
    fn non_numeric_value_is_rejected() {
        let err = parse_rows(&[row(json!([1, 1.0, "abc", 1.0, 1.0, 1.0]))]).unwrap_err();
        assert!(matches!(
            err.kind,
            SchemaErrorKind::NotNumeric { field: "high", .. }
        ));
    }

    #[test]
    fn non_finite_strings_are_not_numeric() {
        for text in ["NaN", "inf", "-infinity"] {
            let err = parse_rows(&[row(json!([1, "1.0", "2.0", "0.5", text, "10"]))]).unwrap_err();
            assert_eq!(err.index, 0);
            assert!(
                matches!(err.kind, SchemaErrorKind::NotNumeric { field: "close", .. }),
                "{text}: {:?}",
                err.kind
            );
        }
    }

    #[test]
    fn null_value_is_not_numeric() {
        let err = parse_rows(&[row(json!([1, 1.0, 1.0, 1.0, null, 1.0]))]).unwrap_err();
        assert!(matches!(
            err.kind,
            SchemaErrorKind::NotNumeric { field: "close", .. }
        ));
    }

    #[test]
    fn fractional_timestamp_is_rejected() {
        let err = parse_rows(&[row(json!([1.5, 1.0, 1.0, 1.0, 1.0, 1.0]))]).unwrap_err();
        assert!(matches!(err.kind, SchemaErrorKind::NotIntegral(_)));
    }

    #[test]
    fn scalar_row_is_rejected() {
        let err = parse_rows(&[row(json!(42))]).unwrap_err();
        assert!(matches!(err.kind, SchemaErrorKind::NotARow(_)));
    }

    #[test]
    fn bad_flag_is_rejected() {
        let err = parse_rows(&[row(json!([1, 1.0, 1.0, 1.0, 1.0, 1.0, "maybe"]))]).unwrap_err();
        assert!(matches!(err.kind, SchemaErrorKind::NotBoolean(_)));
    }

    #[test]
    fn rows_deserialize_from_mixed_json() {
        let rows: Vec<BarRow> = serde_json::from_str(
            r#"[[1, 1, 2, 0.5, 1.5, 10, true], {"timestamp": 2, "open": 1, "high": 2, "low": 0.5, "close": 1.5, "volume": 10}]"#,
        )
        .unwrap();
        let bars = parse_rows(&rows).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[1].timestamp, 2);
    }

    #[test]
    fn bar_converts_back_into_a_row() {
        let bar = Bar::new(5, 1.0, 2.0, 0.5, 1.5, 10.0);
        let bars = parse_rows(&[BarRow::from(bar)]).unwrap();
        assert_eq!(bars[0], bar);
    }
}
