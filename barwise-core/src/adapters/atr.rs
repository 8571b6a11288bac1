//! ATR adapter.
//!
//! Input columns: high, low, close. Output: `{timestamp, atr}`. Lookback: period.

use crate::backend::{NativeBackend, TaBackend};
use crate::domain::Bar;
use crate::indicator::{hlc, timestamps, Indicator, IndicatorError};
use crate::params::AtrParams;
use crate::results::AtrResult;

use super::zip_series;

#[derive(Debug, Clone)]
pub struct AtrIndicator<B = NativeBackend> {
    params: AtrParams,
    backend: B,
    name: String,
}

impl AtrIndicator {
    pub fn new(params: AtrParams) -> Self {
        Self::with_backend(params, NativeBackend)
    }
}

impl<B: TaBackend> AtrIndicator<B> {
    pub fn with_backend(params: AtrParams, backend: B) -> Self {
        Self {
            name: format!("atr_{}", params.period()),
            params,
            backend,
        }
    }

    pub fn params(&self) -> &AtrParams {
        &self.params
    }
}

impl<B: TaBackend> Indicator for AtrIndicator<B> {
    type Output = AtrResult;

    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.params.period()
    }

    fn describe_purpose(&self) -> String {
        "Average True Range: Wilder-smoothed true range, a volatility measure in price units."
            .to_string()
    }

    fn describe_params(&self) -> String {
        format!("period (>= 1) = {}. Default: 14.", self.params.period())
    }

    fn describe_output(&self) -> String {
        format!(
            "One row per bar: {{timestamp, atr}}. The first {} rows are NaN.",
            self.lookback()
        )
    }

    fn on_bars(&self, bars: &[Bar]) -> Result<Vec<AtrResult>, IndicatorError> {
        if bars.is_empty() {
            return Ok(Vec::new());
        }
        let (high, low, close) = hlc(bars);
        let values = self
            .backend
            .atr(&high, &low, &close, self.params.period())?;
        Ok(zip_series("atr", &timestamps(bars), values, |timestamp, atr| {
            AtrResult { timestamp, atr }
        })?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::testing::Truncating;
    use crate::domain::make_bars;
    use crate::indicator::ComputationError;

    #[test]
    fn constant_range_converges_to_range() {
        // make_bars on a flat series: high - low = 2 every bar, no gaps.
        let atr = AtrIndicator::new(AtrParams::new(5).unwrap());
        let rows = atr.on_bars(&make_bars(&[100.0; 20])).unwrap();
        assert!(rows[..5].iter().all(|r| r.atr.is_nan()));
        for row in &rows[5..] {
            assert!((row.atr - 2.0).abs() < 1e-12);
        }
    }

    #[test]
    fn truncated_backend_output_is_rejected() {
        let atr = AtrIndicator::with_backend(AtrParams::default(), Truncating);
        let err = atr.on_bars(&make_bars(&[1.0, 2.0, 3.0])).unwrap_err();
        assert!(matches!(
            err,
            IndicatorError::Computation(ComputationError::LengthMismatch {
                series: "atr",
                expected: 3,
                actual: 2,
            })
        ));
    }
}
