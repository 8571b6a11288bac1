//! Moving-average adapters: simple (MA) and exponential (EMA).
//!
//! Input column: close. Output: `{timestamp, value}` for both kinds.
//! Lookback: period - 1. The EMA is seeded with the SMA of the first `period`
//! closes.

use crate::backend::{NativeBackend, TaBackend};
use crate::domain::Bar;
use crate::indicator::{closes, timestamps, Indicator, IndicatorError};
use crate::params::{EmaParams, MaParams};
use crate::results::MaResult;

use super::zip_series;

fn to_row(timestamp: i64, value: f64) -> MaResult {
    MaResult { timestamp, value }
}

// ─── MA ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct MaIndicator<B = NativeBackend> {
    params: MaParams,
    backend: B,
    name: String,
}

impl MaIndicator {
    pub fn new(params: MaParams) -> Self {
        Self::with_backend(params, NativeBackend)
    }
}

impl<B: TaBackend> MaIndicator<B> {
    pub fn with_backend(params: MaParams, backend: B) -> Self {
        Self {
            name: format!("ma_{}", params.period()),
            params,
            backend,
        }
    }

    pub fn params(&self) -> &MaParams {
        &self.params
    }
}

impl<B: TaBackend> Indicator for MaIndicator<B> {
    type Output = MaResult;

    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.params.period() - 1
    }

    fn describe_purpose(&self) -> String {
        "Simple moving average of close over a fixed window.".to_string()
    }

    fn describe_params(&self) -> String {
        format!("period (>= 1) = {}. Default: 20.", self.params.period())
    }

    fn describe_output(&self) -> String {
        format!(
            "One row per bar: {{timestamp, value}}. The first {} rows are NaN.",
            self.lookback()
        )
    }

    fn on_bars(&self, bars: &[Bar]) -> Result<Vec<MaResult>, IndicatorError> {
        if bars.is_empty() {
            return Ok(Vec::new());
        }
        let values = self.backend.sma(&closes(bars), self.params.period())?;
        Ok(zip_series("ma", &timestamps(bars), values, to_row)?)
    }
}

// ─── EMA ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct EmaIndicator<B = NativeBackend> {
    params: EmaParams,
    backend: B,
    name: String,
}

impl EmaIndicator {
    pub fn new(params: EmaParams) -> Self {
        Self::with_backend(params, NativeBackend)
    }
}

impl<B: TaBackend> EmaIndicator<B> {
    pub fn with_backend(params: EmaParams, backend: B) -> Self {
        Self {
            name: format!("ema_{}", params.period()),
            params,
            backend,
        }
    }

    pub fn params(&self) -> &EmaParams {
        &self.params
    }
}

impl<B: TaBackend> Indicator for EmaIndicator<B> {
    type Output = MaResult;

    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.params.period() - 1
    }

    fn describe_purpose(&self) -> String {
        "Exponential moving average of close, alpha = 2 / (period + 1), seeded with the \
         simple average of the first window."
            .to_string()
    }

    fn describe_params(&self) -> String {
        format!("period (>= 1) = {}. Default: 20.", self.params.period())
    }

    fn describe_output(&self) -> String {
        format!(
            "One row per bar: {{timestamp, value}}. The first {} rows are NaN.",
            self.lookback()
        )
    }

    fn on_bars(&self, bars: &[Bar]) -> Result<Vec<MaResult>, IndicatorError> {
        if bars.is_empty() {
            return Ok(Vec::new());
        }
        let values = self.backend.ema(&closes(bars), self.params.period())?;
        Ok(zip_series("ema", &timestamps(bars), values, to_row)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::make_bars;
    use crate::kernels::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn ma_3_known_values() {
        let ma = MaIndicator::new(MaParams::new(3).unwrap());
        let rows = ma
            .on_bars(&make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0]))
            .unwrap();
        assert!(rows[0].value.is_nan());
        assert!(rows[1].value.is_nan());
        assert_approx(rows[2].value, 11.0, DEFAULT_EPSILON);
        assert_approx(rows[3].value, 12.0, DEFAULT_EPSILON);
        assert_approx(rows[4].value, 13.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_seed_equals_sma() {
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let ema = EmaIndicator::new(EmaParams::new(3).unwrap());
        let ma = MaIndicator::new(MaParams::new(3).unwrap());
        let e = ema.on_bars(&bars).unwrap();
        let m = ma.on_bars(&bars).unwrap();
        assert_approx(e[2].value, m[2].value, DEFAULT_EPSILON);
        // alpha = 0.5: 0.5*13 + 0.5*11 = 12
        assert_approx(e[3].value, 12.0, DEFAULT_EPSILON);
    }

    #[test]
    fn period_one_tracks_close() {
        let ma = MaIndicator::new(MaParams::new(1).unwrap());
        let rows = ma.on_bars(&make_bars(&[3.0, 5.0])).unwrap();
        assert_eq!(ma.lookback(), 0);
        assert_eq!(rows[0].value, 3.0);
        assert_eq!(rows[1].value, 5.0);
    }
}
