//! Average True Range with Wilder smoothing.
//!
//! The true range of bar `t` is the widest of `high - low`,
//! `|high - prev_close|` and `|low - prev_close|`. Bar 0 has no previous close,
//! so its true range is undefined and the seed averages TR[1..=period].
//! Lookback: period.

use super::ema::smooth;

/// True range per bar; index 0 is always NaN.
pub fn true_range(high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    let n = high.len().min(low.len()).min(close.len());
    let mut out = Vec::with_capacity(n);
    if n == 0 {
        return out;
    }
    out.push(f64::NAN);

    out.extend((1..n).map(|t| {
        let prev_close = close[t - 1];
        let spread = high[t] - low[t];
        let up = (high[t] - prev_close).abs();
        let down = (low[t] - prev_close).abs();
        // f64::max ignores a NaN operand; keep NaN inputs visible.
        if spread.is_nan() || up.is_nan() || down.is_nan() {
            f64::NAN
        } else {
            spread.max(up).max(down)
        }
    }));
    out
}

pub fn atr(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    let tr = true_range(high, low, close);
    let mut out = vec![f64::NAN; tr.len()];
    if period == 0 || tr.len() <= period {
        return out;
    }

    let smoothed = smooth(&tr[1..], period, 1.0 / period as f64);
    out[1..].copy_from_slice(&smoothed);
    out
}
