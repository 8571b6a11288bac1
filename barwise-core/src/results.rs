//! Result contract and concrete result rows.
//!
//! Every row carries the timestamp of the bar it was computed from. Computed
//! fields are `f64` and are NaN during warm-up; NaN serialises as JSON `null`
//! and `null` deserialises back to NaN.

use serde::{Deserialize, Serialize};

/// Minimal shape shared by every indicator result.
pub trait IndicatorResult: Serialize + Clone + Send + Sync + 'static {
    fn timestamp(&self) -> i64;
}

/// Serialise NaN as `null`, deserialise `null` as NaN.
pub mod nan_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_nan() {
            serializer.serialize_none()
        } else {
            serializer.serialize_f64(*value)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
    }
}

macro_rules! result_row {
    ($(#[$meta:meta])* $name:ident { $($field:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            pub timestamp: i64,
            $(
                #[serde(with = "nan_as_null")]
                pub $field: f64,
            )+
        }

        impl IndicatorResult for $name {
            fn timestamp(&self) -> i64 {
                self.timestamp
            }
        }
    };
}

result_row!(
    /// MACD line, signal line and histogram.
    MacdResult { macd, signal, hist }
);

result_row!(RsiResult { rsi });

result_row!(AtrResult { atr });

result_row!(CciResult { cci });

result_row!(
    /// Moving-average value; shared by MA and EMA.
    MaResult { value }
);

result_row!(
    /// Daily volume profile: point of control and value-area bounds.
    PocResult { poc, vah, val }
);

/// Closed set of result kinds.
///
/// Serialises untagged so each row renders as the bare field set of its kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum IndicatorOutput {
    Macd(MacdResult),
    Rsi(RsiResult),
    Atr(AtrResult),
    Cci(CciResult),
    Ma(MaResult),
    Ema(MaResult),
    Poc(PocResult),
}

impl IndicatorResult for IndicatorOutput {
    fn timestamp(&self) -> i64 {
        match self {
            IndicatorOutput::Macd(r) => r.timestamp,
            IndicatorOutput::Rsi(r) => r.timestamp,
            IndicatorOutput::Atr(r) => r.timestamp,
            IndicatorOutput::Cci(r) => r.timestamp,
            IndicatorOutput::Ma(r) | IndicatorOutput::Ema(r) => r.timestamp,
            IndicatorOutput::Poc(r) => r.timestamp,
        }
    }
}

impl IndicatorOutput {
    /// Computed fields as `(name, value)` pairs, in declaration order.
    pub fn values(&self) -> Vec<(&'static str, f64)> {
        match self {
            IndicatorOutput::Macd(r) => {
                vec![("macd", r.macd), ("signal", r.signal), ("hist", r.hist)]
            }
            IndicatorOutput::Rsi(r) => vec![("rsi", r.rsi)],
            IndicatorOutput::Atr(r) => vec![("atr", r.atr)],
            IndicatorOutput::Cci(r) => vec![("cci", r.cci)],
            IndicatorOutput::Ma(r) | IndicatorOutput::Ema(r) => vec![("value", r.value)],
            IndicatorOutput::Poc(r) => vec![("poc", r.poc), ("vah", r.vah), ("val", r.val)],
        }
    }

    /// True once every computed field is defined.
    pub fn is_warm(&self) -> bool {
        self.values().iter().all(|(_, v)| !v.is_nan())
    }
}
