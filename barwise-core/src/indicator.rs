//! The indicator adapter contract.
//!
//! An indicator is a stateless transform: an ordered bar slice in, one result
//! row per bar out. Adapters extract the numeric columns they need, call the
//! numeric backend, check that every returned series lines up with the input,
//! and zip the values back onto the bar timestamps. Warm-up positions stay NaN.
//!
//! # Look-ahead contamination guard
//! For every TA kind, no value at bar t may depend on bars t+1 or later. The
//! daily volume profile is the one deliberate exception (see its module docs).

use std::ops::Deref;

use crate::backend::BackendError;
use crate::domain::{parse_rows, Bar, BarRow, SchemaError};
use crate::params::ValidationError;
use crate::results::IndicatorResult;

// ─── Errors ──────────────────────────────────────────────────────────

/// The backend failed or returned a series that does not line up with the bars.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ComputationError {
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("backend returned {actual} values for `{series}`, expected {expected}")]
    LengthMismatch {
        series: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Anything that can go wrong while building or running an indicator.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IndicatorError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Computation(#[from] ComputationError),
}

impl From<BackendError> for IndicatorError {
    fn from(err: BackendError) -> Self {
        IndicatorError::Computation(ComputationError::Backend(err))
    }
}

// ─── Trait ───────────────────────────────────────────────────────────

/// Trait for indicator adapters.
///
/// `on_bars` returns exactly `bars.len()` rows with `rows[i].timestamp() ==
/// bars[i].timestamp`. Short input is not an error: it yields full-length
/// all-NaN rows. Two calls with the same input are bit-identical.
pub trait Indicator: Send + Sync {
    type Output: IndicatorResult;

    /// Human-readable name (e.g., "macd_12_26_9", "rsi_14").
    fn name(&self) -> &str;

    /// Number of leading rows that are NaN regardless of input length.
    fn lookback(&self) -> usize;

    fn version(&self) -> &'static str {
        "1.0.0"
    }

    /// What the indicator computes.
    fn describe_purpose(&self) -> String;

    /// Accepted parameters, with the values this instance was built with.
    fn describe_params(&self) -> String;

    /// Shape of each result row.
    fn describe_output(&self) -> String;

    fn on_bars(&self, bars: &[Bar]) -> Result<Vec<Self::Output>, IndicatorError>;

    /// Parse untyped rows, then compute. Every row is checked before the
    /// backend is touched, so a bad row never yields partial output.
    fn on_rows(&self, rows: &[BarRow]) -> Result<Vec<Self::Output>, IndicatorError> {
        let bars = parse_rows(rows)?;
        self.on_bars(&bars)
    }

    /// Called when a scoped use begins.
    fn acquire(&self) {}

    /// Called when a scoped use ends, however it ends.
    fn release(&self) {}

    /// Bracket a use of this indicator with `acquire` and `release`.
    fn scoped(&self) -> Scoped<'_, Self>
    where
        Self: Sized,
    {
        Scoped::new(self)
    }
}

// ─── Scoped guard ────────────────────────────────────────────────────

/// Guard returned by [`Indicator::scoped`].
///
/// Derefs to the indicator. Dropping it calls `release`, which also happens
/// on early `?` returns and during panic unwinding.
pub struct Scoped<'a, I: Indicator> {
    indicator: &'a I,
    _span: tracing::span::EnteredSpan,
}

impl<'a, I: Indicator> Scoped<'a, I> {
    fn new(indicator: &'a I) -> Self {
        let span = tracing::debug_span!("scoped", indicator = indicator.name()).entered();
        indicator.acquire();
        tracing::trace!("acquired");
        Self {
            indicator,
            _span: span,
        }
    }
}

impl<I: Indicator> Deref for Scoped<'_, I> {
    type Target = I;

    fn deref(&self) -> &I {
        self.indicator
    }
}

impl<I: Indicator> Drop for Scoped<'_, I> {
    fn drop(&mut self) {
        self.indicator.release();
        tracing::trace!("released");
    }
}

// ─── Adapter helpers ─────────────────────────────────────────────────

pub(crate) fn timestamps(bars: &[Bar]) -> Vec<i64> {
    bars.iter().map(|b| b.timestamp).collect()
}

pub(crate) fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

/// High, low and close columns.
pub(crate) fn hlc(bars: &[Bar]) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let mut high = Vec::with_capacity(bars.len());
    let mut low = Vec::with_capacity(bars.len());
    let mut close = Vec::with_capacity(bars.len());
    for bar in bars {
        high.push(bar.high);
        low.push(bar.low);
        close.push(bar.close);
    }
    (high, low, close)
}

/// Reject a backend series whose length differs from the bar count.
pub(crate) fn ensure_aligned(
    series: &'static str,
    values: &[f64],
    expected: usize,
) -> Result<(), ComputationError> {
    if values.len() != expected {
        return Err(ComputationError::LengthMismatch {
            series,
            expected,
            actual: values.len(),
        });
    }
    Ok(())
}
