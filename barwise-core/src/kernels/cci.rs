//! Commodity Channel Index (CCI).
//!
//! Typical price TP = (high + low + close) / 3.
//! CCI = (TP - SMA(TP)) / (0.015 * mean absolute deviation of TP).
//! Lookback: period - 1.
//! Zero deviation (or TP exactly on its mean) yields 0, as TA-Lib does.

const LAMBERT: f64 = 0.015;

pub fn cci(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    let n = high.len().min(low.len()).min(close.len());
    let mut result = vec![f64::NAN; n];

    if period == 0 || n < period {
        return result;
    }

    let typical: Vec<f64> = (0..n)
        .map(|i| (high[i] + low[i] + close[i]) / 3.0)
        .collect();

    for i in (period - 1)..n {
        let window = &typical[(i + 1 - period)..=i];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        let mean = window.iter().sum::<f64>() / period as f64;
        let deviation = window.iter().map(|v| (v - mean).abs()).sum::<f64>() / period as f64;
        let distance = typical[i] - mean;

        result[i] = if deviation == 0.0 || distance == 0.0 {
            0.0
        } else {
            distance / (LAMBERT * deviation)
        };
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn cci_known_value() {
        // Use high = low = close so TP = close.
        // Window [1, 2, 3]: mean 2, mean dev 2/3, distance 1
        // CCI = 1 / (0.015 * 2/3) = 100
        let c = [1.0, 2.0, 3.0];
        let result = cci(&c, &c, &c, 3);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_approx(result[2], 100.0, 1e-9);
    }

    #[test]
    fn cci_flat_window_is_zero() {
        let c = [5.0; 4];
        let result = cci(&c, &c, &c, 2);
        assert!(result[0].is_nan());
        assert_approx(result[1], 0.0, DEFAULT_EPSILON);
        assert_approx(result[3], 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn cci_nan_only_taints_windows_containing_it() {
        let c = [1.0, f64::NAN, 3.0, 4.0, 5.0];
        let result = cci(&c, &c, &c, 2);
        assert!(result[1].is_nan());
        assert!(result[2].is_nan());
        assert!(!result[3].is_nan());
    }
}
