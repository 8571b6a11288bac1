//! Exponential smoothing with a simple-average seed.
//!
//! `EMA[p-1]` is the mean of the first `p` inputs; after that
//! `EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1]` with `alpha = 2 / (p + 1)`.
//! Wilder smoothing (RSI, ATR) is the same recursion with `alpha = 1 / p`.

pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 {
        return vec![f64::NAN; values.len()];
    }
    smooth(values, period, 2.0 / (period as f64 + 1.0))
}

/// Mean-seeded recursive smoothing. A NaN inside the seed window leaves the
/// whole output NaN; a NaN after it ends the series there.
pub(crate) fn smooth(values: &[f64], period: usize, alpha: f64) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    let window = &values[..period];
    if window.iter().any(|v| v.is_nan()) {
        return out;
    }
    let mut prev = window.iter().sum::<f64>() / period as f64;
    out[period - 1] = prev;

    for (slot, &x) in out[period..].iter_mut().zip(&values[period..]) {
        if x.is_nan() {
            break;
        }
        prev = alpha * x + (1.0 - alpha) * prev;
        *slot = prev;
    }
    out
}
