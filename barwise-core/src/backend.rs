//! Numeric backend seam.
//!
//! Adapters never compute indicator math themselves; they call a `TaBackend`.
//! Each entry point returns one or more series that must be exactly as long as
//! the input (the adapters check this on every call). `NativeBackend` is the
//! in-process implementation built on `crate::kernels`, which follows TA-Lib's
//! lookback and seeding conventions.

use crate::kernels;

/// Errors raised by a backend entry point.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BackendError {
    #[error("{function}: input columns differ in length ({lengths:?})")]
    InputLengthMismatch {
        function: &'static str,
        lengths: Vec<usize>,
    },

    #[error("{function}: {reason}")]
    InvalidArgument {
        function: &'static str,
        reason: String,
    },

    #[error("{function}: {reason}")]
    Failed {
        function: &'static str,
        reason: String,
    },
}

/// The three MACD output series.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub hist: Vec<f64>,
}

/// A general-purpose TA computation library, one entry point per indicator.
pub trait TaBackend: Send + Sync {
    fn name(&self) -> &str;

    fn sma(&self, close: &[f64], period: usize) -> Result<Vec<f64>, BackendError>;

    fn ema(&self, close: &[f64], period: usize) -> Result<Vec<f64>, BackendError>;

    fn rsi(&self, close: &[f64], period: usize) -> Result<Vec<f64>, BackendError>;

    fn atr(
        &self,
        high: &[f64],
        low: &[f64],
        close: &[f64],
        period: usize,
    ) -> Result<Vec<f64>, BackendError>;

    fn cci(
        &self,
        high: &[f64],
        low: &[f64],
        close: &[f64],
        period: usize,
    ) -> Result<Vec<f64>, BackendError>;

    fn macd(
        &self,
        close: &[f64],
        fast_period: usize,
        slow_period: usize,
        signal_period: usize,
    ) -> Result<MacdSeries, BackendError>;
}

impl<B: TaBackend + ?Sized> TaBackend for &B {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn sma(&self, close: &[f64], period: usize) -> Result<Vec<f64>, BackendError> {
        (**self).sma(close, period)
    }

    fn ema(&self, close: &[f64], period: usize) -> Result<Vec<f64>, BackendError> {
        (**self).ema(close, period)
    }

    fn rsi(&self, close: &[f64], period: usize) -> Result<Vec<f64>, BackendError> {
        (**self).rsi(close, period)
    }

    fn atr(
        &self,
        high: &[f64],
        low: &[f64],
        close: &[f64],
        period: usize,
    ) -> Result<Vec<f64>, BackendError> {
        (**self).atr(high, low, close, period)
    }

    fn cci(
        &self,
        high: &[f64],
        low: &[f64],
        close: &[f64],
        period: usize,
    ) -> Result<Vec<f64>, BackendError> {
        (**self).cci(high, low, close, period)
    }

    fn macd(
        &self,
        close: &[f64],
        fast_period: usize,
        slow_period: usize,
        signal_period: usize,
    ) -> Result<MacdSeries, BackendError> {
        (**self).macd(close, fast_period, slow_period, signal_period)
    }
}

/// In-process backend over `crate::kernels`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeBackend;

fn require_period(function: &'static str, period: usize, min: usize) -> Result<(), BackendError> {
    if period < min {
        return Err(BackendError::InvalidArgument {
            function,
            reason: format!("period must be >= {min}, got {period}"),
        });
    }
    Ok(())
}

fn require_same_len(function: &'static str, columns: &[&[f64]]) -> Result<(), BackendError> {
    let lengths: Vec<usize> = columns.iter().map(|c| c.len()).collect();
    if lengths.windows(2).any(|w| w[0] != w[1]) {
        return Err(BackendError::InputLengthMismatch { function, lengths });
    }
    Ok(())
}

impl TaBackend for NativeBackend {
    fn name(&self) -> &str {
        "native"
    }

    fn sma(&self, close: &[f64], period: usize) -> Result<Vec<f64>, BackendError> {
        require_period("SMA", period, 1)?;
        Ok(kernels::sma(close, period))
    }

    fn ema(&self, close: &[f64], period: usize) -> Result<Vec<f64>, BackendError> {
        require_period("EMA", period, 1)?;
        Ok(kernels::ema(close, period))
    }

    fn rsi(&self, close: &[f64], period: usize) -> Result<Vec<f64>, BackendError> {
        require_period("RSI", period, 1)?;
        Ok(kernels::rsi(close, period))
    }

    fn atr(
        &self,
        high: &[f64],
        low: &[f64],
        close: &[f64],
        period: usize,
    ) -> Result<Vec<f64>, BackendError> {
        require_period("ATR", period, 1)?;
        require_same_len("ATR", &[high, low, close])?;
        Ok(kernels::atr(high, low, close, period))
    }

    fn cci(
        &self,
        high: &[f64],
        low: &[f64],
        close: &[f64],
        period: usize,
    ) -> Result<Vec<f64>, BackendError> {
        require_period("CCI", period, 2)?;
        require_same_len("CCI", &[high, low, close])?;
        Ok(kernels::cci(high, low, close, period))
    }

    fn macd(
        &self,
        close: &[f64],
        fast_period: usize,
        slow_period: usize,
        signal_period: usize,
    ) -> Result<MacdSeries, BackendError> {
        require_period("MACD", fast_period, 1)?;
        require_period("MACD", slow_period, 1)?;
        require_period("MACD", signal_period, 1)?;
        Ok(kernels::macd(close, fast_period, slow_period, signal_period))
    }
}
