//! MACD adapter.
//!
//! Input column: close. Output: `{timestamp, macd, signal, hist}`.
//! Lookback: (slow - 1) + (signal - 1); with the default (12, 26, 9) the first
//! 33 rows are NaN in all three fields.

use crate::backend::{NativeBackend, TaBackend};
use crate::domain::Bar;
use crate::indicator::{closes, ensure_aligned, timestamps, Indicator, IndicatorError};
use crate::kernels::macd_lookback;
use crate::params::MacdParams;
use crate::results::MacdResult;

#[derive(Debug, Clone)]
pub struct MacdIndicator<B = NativeBackend> {
    params: MacdParams,
    backend: B,
    name: String,
}

impl MacdIndicator {
    pub fn new(params: MacdParams) -> Self {
        Self::with_backend(params, NativeBackend)
    }
}

impl<B: TaBackend> MacdIndicator<B> {
    pub fn with_backend(params: MacdParams, backend: B) -> Self {
        Self {
            name: format!(
                "macd_{}_{}_{}",
                params.fast_period(),
                params.slow_period(),
                params.signal_period()
            ),
            params,
            backend,
        }
    }

    pub fn params(&self) -> &MacdParams {
        &self.params
    }
}

impl<B: TaBackend> Indicator for MacdIndicator<B> {
    type Output = MacdResult;

    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        macd_lookback(
            self.params.fast_period(),
            self.params.slow_period(),
            self.params.signal_period(),
        )
    }

    fn describe_purpose(&self) -> String {
        "Moving Average Convergence/Divergence: the spread between a fast and a slow EMA of \
         close, its signal EMA and their difference."
            .to_string()
    }

    fn describe_params(&self) -> String {
        format!(
            "fast_period (>= 1, < slow_period) = {}, slow_period (>= 1) = {}, \
             signal_period (>= 1) = {}. Defaults: 12, 26, 9.",
            self.params.fast_period(),
            self.params.slow_period(),
            self.params.signal_period()
        )
    }

    fn describe_output(&self) -> String {
        format!(
            "One row per bar: {{timestamp, macd, signal, hist}}. The first {} rows are NaN.",
            self.lookback()
        )
    }

    fn on_bars(&self, bars: &[Bar]) -> Result<Vec<MacdResult>, IndicatorError> {
        if bars.is_empty() {
            return Ok(Vec::new());
        }

        let close = closes(bars);
        let series = self.backend.macd(
            &close,
            self.params.fast_period(),
            self.params.slow_period(),
            self.params.signal_period(),
        )?;

        let n = bars.len();
        ensure_aligned("macd", &series.macd, n)?;
        ensure_aligned("signal", &series.signal, n)?;
        ensure_aligned("hist", &series.hist, n)?;

        Ok(timestamps(bars)
            .into_iter()
            .enumerate()
            .map(|(i, timestamp)| MacdResult {
                timestamp,
                macd: series.macd[i],
                signal: series.signal[i],
                hist: series.hist[i],
            })
            .collect())
    }
}
