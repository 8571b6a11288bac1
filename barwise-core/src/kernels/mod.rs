//! Native numeric kernels behind `NativeBackend`.
//!
//! Every kernel takes plain `f64` columns and returns series of the same length
//! as its input, with `f64::NAN` for the first `lookback` positions. Lookbacks
//! and seeding follow TA-Lib so results line up with its output:
//!
//! | kernel | lookback                      |
//! |--------|-------------------------------|
//! | SMA    | period - 1                    |
//! | EMA    | period - 1                    |
//! | RSI    | period                        |
//! | ATR    | period                        |
//! | CCI    | period - 1                    |
//! | MACD   | (slow - 1) + (signal - 1)     |
//!
//! NaN inputs propagate forward instead of being skipped.

pub mod atr;
pub mod cci;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

pub use atr::{atr, true_range};
pub use cci::cci;
pub use ema::ema;
pub use macd::{macd, macd_lookback};
pub use rsi::rsi;
pub use sma::sma;

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for kernel tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
