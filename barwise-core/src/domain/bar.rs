//! Bar: the fundamental market data unit.

use serde::{Deserialize, Serialize};

/// One OHLCV sample.
///
/// `timestamp` is epoch milliseconds and is expected to be non-decreasing across
/// a sequence. `is_close` is false while the bar is still forming.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    #[serde(default = "finalized")]
    pub is_close: bool,
}

fn finalized() -> bool {
    true
}

impl Bar {
    /// A finalized bar.
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
            is_close: true,
        }
    }

    /// (high + low + close) / 3
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// Open and close inside `[low, high]`, volume non-negative, nothing NaN.
    pub fn is_sane(&self) -> bool {
        let range = self.low..=self.high;
        range.contains(&self.open) && range.contains(&self.close) && self.volume >= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bar() -> Bar {
        Bar::new(1_704_153_600_000, 100.0, 105.0, 98.0, 103.0, 50_000.0)
    }

    #[test]
    fn sanity_accepts_consistent_ohlcv() {
        assert!(sample_bar().is_sane());
        assert!(Bar::new(0, 1.0, 1.0, 1.0, 1.0, 0.0).is_sane());
    }

    #[test]
    fn sanity_rejects_nan_and_inverted_ranges() {
        let nan_open = Bar {
            open: f64::NAN,
            ..sample_bar()
        };
        let close_above_high = Bar {
            close: 106.0,
            ..sample_bar()
        };
        let negative_volume = Bar {
            volume: -1.0,
            ..sample_bar()
        };
        assert!(!nan_open.is_sane());
        assert!(!close_above_high.is_sane());
        assert!(!negative_volume.is_sane());
    }

    #[test]
    fn typical_price_is_hlc_mean() {
        assert_eq!(sample_bar().typical_price(), (105.0 + 98.0 + 103.0) / 3.0);
    }

    #[test]
    fn missing_is_close_defaults_to_finalized() {
        let json = r#"{"timestamp":1,"open":1.0,"high":2.0,"low":0.5,"close":1.5,"volume":10.0}"#;
        let bar: Bar = serde_json::from_str(json).unwrap();
        assert!(bar.is_close);
    }
}
