//! Concrete indicator adapters over a [`TaBackend`](crate::backend::TaBackend).
//!
//! Each adapter owns a validated parameter set and a backend. All of them
//! follow the same path: empty input short-circuits, the needed columns are
//! pulled out of the bars, the backend computes, every returned series is
//! length-checked, and values are zipped onto the bar timestamps.
//!
//! `TaIndicator` wraps any one of them behind a single type whose output is
//! the closed `IndicatorOutput` sum.

pub mod atr;
pub mod cci;
pub mod ma;
pub mod macd;
pub mod rsi;
pub mod ta;

pub use atr::AtrIndicator;
pub use cci::CciIndicator;
pub use ma::{EmaIndicator, MaIndicator};
pub use macd::MacdIndicator;
pub use rsi::RsiIndicator;
pub use ta::{TaIndicator, TaSpec};

use crate::indicator::{ensure_aligned, ComputationError};

/// Length-check one backend series and zip it onto the timestamps.
pub(crate) fn zip_series<R>(
    series: &'static str,
    timestamps: &[i64],
    values: Vec<f64>,
    row: impl Fn(i64, f64) -> R,
) -> Result<Vec<R>, ComputationError> {
    ensure_aligned(series, &values, timestamps.len())?;
    Ok(timestamps
        .iter()
        .zip(values)
        .map(|(&ts, value)| row(ts, value))
        .collect())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zip_series_pairs_in_order() {
        let rows = zip_series("x", &[10, 20], vec![1.0, f64::NAN], |t, v| (t, v)).unwrap();
        assert_eq!(rows[0], (10, 1.0));
        assert_eq!(rows[1].0, 20);
        assert!(rows[1].1.is_nan());
    }

    #[test]
    fn zip_series_rejects_long_output() {
        let err = zip_series("x", &[1], vec![1.0, 2.0], |t, v| (t, v)).unwrap_err();
        assert_eq!(
            err,
            ComputationError::LengthMismatch {
                series: "x",
                expected: 1,
                actual: 2,
            }
        );
    }
}
