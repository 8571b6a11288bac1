//! RSI adapter.
//!
//! Input column: close. Output: `{timestamp, rsi}`. Lookback: period.

use crate::backend::{NativeBackend, TaBackend};
use crate::domain::Bar;
use crate::indicator::{closes, timestamps, Indicator, IndicatorError};
use crate::params::RsiParams;
use crate::results::RsiResult;

use super::zip_series;

#[derive(Debug, Clone)]
pub struct RsiIndicator<B = NativeBackend> {
    params: RsiParams,
    backend: B,
    name: String,
}

impl RsiIndicator {
    pub fn new(params: RsiParams) -> Self {
        Self::with_backend(params, NativeBackend)
    }
}

impl<B: TaBackend> RsiIndicator<B> {
    pub fn with_backend(params: RsiParams, backend: B) -> Self {
        Self {
            name: format!("rsi_{}", params.period()),
            params,
            backend,
        }
    }

    pub fn params(&self) -> &RsiParams {
        &self.params
    }
}

impl<B: TaBackend> Indicator for RsiIndicator<B> {
    type Output = RsiResult;

    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.params.period()
    }

    fn describe_purpose(&self) -> String {
        "Relative Strength Index of close, 0 to 100, using Wilder smoothing.".to_string()
    }

    fn describe_params(&self) -> String {
        format!(
            "period (>= 1) = {}. Default: 14.",
            self.params.period()
        )
    }

    fn describe_output(&self) -> String {
        format!(
            "One row per bar: {{timestamp, rsi}}. The first {} rows are NaN.",
            self.lookback()
        )
    }

    fn on_bars(&self, bars: &[Bar]) -> Result<Vec<RsiResult>, IndicatorError> {
        if bars.is_empty() {
            return Ok(Vec::new());
        }
        let values = self.backend.rsi(&closes(bars), self.params.period())?;
        Ok(zip_series("rsi", &timestamps(bars), values, |timestamp, rsi| {
            RsiResult { timestamp, rsi }
        })?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::testing::Counting;
    use crate::domain::make_bars;

    #[test]
    fn warmup_rows_are_nan_then_bounded() {
        let rsi = RsiIndicator::new(RsiParams::new(3).unwrap());
        let bars = make_bars(&[100.0, 102.0, 101.0, 104.0, 103.0, 99.0, 101.0]);
        let rows = rsi.on_bars(&bars).unwrap();

        assert_eq!(rows.len(), bars.len());
        assert!(rows[..3].iter().all(|r| r.rsi.is_nan()));
        for (row, bar) in rows.iter().zip(&bars) {
            assert_eq!(row.timestamp, bar.timestamp);
        }
        assert!(rows[3..].iter().all(|r| (0.0..=100.0).contains(&r.rsi)));
    }

    #[test]
    fn empty_input_skips_backend() {
        let rsi = RsiIndicator::with_backend(RsiParams::default(), Counting::default());
        assert!(rsi.on_bars(&[]).unwrap().is_empty());
        assert_eq!(rsi.backend.calls(), 0);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let rsi = RsiIndicator::new(RsiParams::default());
        let bars = make_bars(&(0..40).map(|i| 50.0 + (i % 7) as f64).collect::<Vec<_>>());
        let a: Vec<u64> = rsi.on_bars(&bars).unwrap().iter().map(|r| r.rsi.to_bits()).collect();
        let b: Vec<u64> = rsi.on_bars(&bars).unwrap().iter().map(|r| r.rsi.to_bits()).collect();
        assert_eq!(a, b);
    }
}
