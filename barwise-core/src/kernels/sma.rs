//! Simple moving average: the plain mean of the trailing `period` values.
//! A window holding a NaN yields NaN. Lookback: period - 1.

pub fn sma(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    for (slot, window) in out[period - 1..].iter_mut().zip(values.windows(period)) {
        if !window.iter().any(|v| v.is_nan()) {
            *slot = window.iter().sum::<f64>() / period as f64;
        }
    }
    out
}
