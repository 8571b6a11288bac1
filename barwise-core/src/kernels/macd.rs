//! Moving Average Convergence/Divergence (MACD).
//!
//! MACD line = EMA(fast) - EMA(slow); signal = EMA(signal) of the MACD line;
//! histogram = MACD - signal.
//!
//! Alignment follows TA-Lib: both EMAs start at index slow-1 (the fast EMA is
//! seeded from the `fast` values ending there, not from the series start), and
//! all three outputs stay NaN until the signal line exists at
//! (slow - 1) + (signal - 1). A fast period above the slow one is swapped.

use super::ema::ema;
use crate::backend::MacdSeries;

/// Index of the first defined MACD output.
pub fn macd_lookback(fast_period: usize, slow_period: usize, signal_period: usize) -> usize {
    let slow = fast_period.max(slow_period);
    slow.saturating_sub(1) + signal_period.saturating_sub(1)
}

pub fn macd(
    values: &[f64],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> MacdSeries {
    let n = values.len();
    let mut out = MacdSeries {
        macd: vec![f64::NAN; n],
        signal: vec![f64::NAN; n],
        hist: vec![f64::NAN; n],
    };

    let (fast, slow) = if fast_period > slow_period {
        (slow_period, fast_period)
    } else {
        (fast_period, slow_period)
    };
    if fast == 0 || signal_period == 0 {
        return out;
    }

    let lookback = macd_lookback(fast, slow, signal_period);
    if n <= lookback {
        return out;
    }

    let start = slow - 1;
    let slow_ema = ema(values, slow);
    // Fast EMA seeded over the `fast` values ending at `start`.
    let fast_ema = ema(&values[(slow - fast)..], fast);

    let line: Vec<f64> = (start..n)
        .map(|i| fast_ema[i - (slow - fast)] - slow_ema[i])
        .collect();
    let signal = ema(&line, signal_period);

    for i in lookback..n {
        let k = i - start;
        out.macd[i] = line[k];
        out.signal[i] = signal[k];
        out.hist[i] = line[k] - signal[k];
    }

    out
}
