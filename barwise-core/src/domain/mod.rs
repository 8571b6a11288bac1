//! Domain types for Barwise

pub mod bar;
pub mod row;

pub use bar::Bar;
pub use row::{parse_rows, BarRow, SchemaError, SchemaErrorKind};

/// Create closed bars from close prices for testing.
///
/// Generates plausible OHLV: open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
/// Timestamps start at 2024-01-02T00:00:00Z and advance one minute per bar.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    const BASE_MS: i64 = 1_704_153_600_000;
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                timestamp: BASE_MS + i as i64 * 60_000,
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
                is_close: true,
            }
        })
        .collect()
}
