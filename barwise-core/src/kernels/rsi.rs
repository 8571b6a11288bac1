//! Relative Strength Index.
//!
//! Average gain and average loss over bar-to-bar changes, each Wilder-smoothed
//! from a plain-mean seed over the first `period` changes; then
//! `RSI = 100 * gain / (gain + loss)`. Lookback: period.
//! A window without movement yields 0, matching TA-Lib.

use super::ema::smooth;

pub fn rsi(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 || values.len() <= period {
        return out;
    }

    let changes: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();
    let gains: Vec<f64> = changes.iter().map(|&c| if c < 0.0 { 0.0 } else { c }).collect();
    let losses: Vec<f64> = changes.iter().map(|&c| if c > 0.0 { 0.0 } else { -c }).collect();

    let alpha = 1.0 / period as f64;
    let avg_gain = smooth(&gains, period, alpha);
    let avg_loss = smooth(&losses, period, alpha);

    // Change i sits between bars i and i + 1.
    for (slot, (&g, &l)) in out[1..].iter_mut().zip(avg_gain.iter().zip(&avg_loss)) {
        if g.is_nan() || l.is_nan() {
            continue;
        }
        let total = g + l;
        *slot = if total == 0.0 { 0.0 } else { 100.0 * g / total };
    }
    out
}
