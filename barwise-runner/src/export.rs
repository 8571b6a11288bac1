//! Result rendering: JSON and CSV.
//!
//! JSON rows carry each kind's own field set with NaN as `null`. CSV has a
//! `timestamp` column followed by the kind's fields; NaN is an empty cell.

use barwise_core::{IndicatorOutput, IndicatorResult};

use crate::batch::RunError;

/// Output format for a result table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

pub fn render(rows: &[IndicatorOutput], format: OutputFormat) -> Result<String, RunError> {
    match format {
        OutputFormat::Json => rows_to_json(rows),
        OutputFormat::Csv => rows_to_csv(rows),
    }
}

pub fn rows_to_json(rows: &[IndicatorOutput]) -> Result<String, RunError> {
    Ok(serde_json::to_string_pretty(rows)?)
}

pub fn rows_to_csv(rows: &[IndicatorOutput]) -> Result<String, RunError> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    if let Some(first) = rows.first() {
        let mut header = vec!["timestamp"];
        header.extend(first.values().iter().map(|(name, _)| *name));
        wtr.write_record(&header)?;
    }

    for row in rows {
        let mut record = vec![row.timestamp().to_string()];
        record.extend(row.values().into_iter().map(|(_, v)| {
            if v.is_nan() {
                String::new()
            } else {
                v.to_string()
            }
        }));
        wtr.write_record(&record)?;
    }

    let data = wtr.into_inner().map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&data).into_owned())
}
