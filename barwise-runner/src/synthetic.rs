//! Synthetic bars for development and smoke runs.
//!
//! A random walk from 100.0 seeded by the BLAKE3 hash of a label, so the same
//! label always yields the same bars. These are clearly fake; callers log a
//! warning when they substitute them for real data.

use barwise_core::Bar;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// 2024-01-02T00:00:00Z in epoch milliseconds.
pub const SYNTHETIC_START_MS: i64 = 1_704_153_600_000;

/// Generate `n` closed bars spaced `interval_ms` apart.
pub fn generate_synthetic_bars(label: &str, n: usize, interval_ms: i64) -> Vec<Bar> {
    let seed: [u8; 32] = *blake3::hash(label.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut bars = Vec::with_capacity(n);
    let mut price = 100.0_f64;

    for i in 0..n {
        let step_return: f64 = rng.gen_range(-0.01..0.01);
        let open = price;
        let close = price * (1.0 + step_return);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.003));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.003));
        let volume = rng.gen_range(100.0..10_000.0_f64).round();

        bars.push(Bar::new(
            SYNTHETIC_START_MS + i as i64 * interval_ms,
            open,
            high,
            low,
            close,
            volume,
        ));
        price = close;
    }

    bars
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_data_is_deterministic() {
        let a = generate_synthetic_bars("BTCUSDT", 50, 60_000);
        let b = generate_synthetic_bars("BTCUSDT", 50, 60_000);
        assert_eq!(a, b);
    }

    #[test]
    fn different_labels_get_different_data() {
        let a = generate_synthetic_bars("BTCUSDT", 20, 60_000);
        let b = generate_synthetic_bars("ETHUSDT", 20, 60_000);
        assert_ne!(a, b);
    }

    #[test]
    fn bars_are_sane_and_evenly_spaced() {
        let bars = generate_synthetic_bars("SANE", 200, 300_000);
        assert_eq!(bars.len(), 200);
        assert!(bars.iter().all(|b| b.is_sane() && b.is_close));
        assert!(bars.windows(2).all(|w| w[1].timestamp - w[0].timestamp == 300_000));
        assert!(bars.windows(2).all(|w| w[1].open == w[0].close));
    }
}
