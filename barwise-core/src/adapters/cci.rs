//! CCI adapter.
//!
//! Input columns: high, low, close. Output: `{timestamp, cci}`.
//! Lookback: period - 1.

use crate::backend::{NativeBackend, TaBackend};
use crate::domain::Bar;
use crate::indicator::{hlc, timestamps, Indicator, IndicatorError};
use crate::params::CciParams;
use crate::results::CciResult;

use super::zip_series;

#[derive(Debug, Clone)]
pub struct CciIndicator<B = NativeBackend> {
    params: CciParams,
    backend: B,
    name: String,
}

impl CciIndicator {
    pub fn new(params: CciParams) -> Self {
        Self::with_backend(params, NativeBackend)
    }
}

impl<B: TaBackend> CciIndicator<B> {
    pub fn with_backend(params: CciParams, backend: B) -> Self {
        Self {
            name: format!("cci_{}", params.period()),
            params,
            backend,
        }
    }

    pub fn params(&self) -> &CciParams {
        &self.params
    }
}

impl<B: TaBackend> Indicator for CciIndicator<B> {
    type Output = CciResult;

    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.params.period() - 1
    }

    fn describe_purpose(&self) -> String {
        "Commodity Channel Index: distance of the typical price from its moving average, \
         scaled by 0.015 times the mean absolute deviation."
            .to_string()
    }

    fn describe_params(&self) -> String {
        format!("period (>= 2) = {}. Default: 20.", self.params.period())
    }

    fn describe_output(&self) -> String {
        format!(
            "One row per bar: {{timestamp, cci}}. The first {} rows are NaN.",
            self.lookback()
        )
    }

    fn on_bars(&self, bars: &[Bar]) -> Result<Vec<CciResult>, IndicatorError> {
        if bars.is_empty() {
            return Ok(Vec::new());
        }
        let (high, low, close) = hlc(bars);
        let values = self
            .backend
            .cci(&high, &low, &close, self.params.period())?;
        Ok(zip_series("cci", &timestamps(bars), values, |timestamp, cci| {
            CciResult { timestamp, cci }
        })?)
    }
}
