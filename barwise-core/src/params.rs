//! Validated, immutable parameter sets.
//!
//! Every indicator kind has its own parameter struct with private fields.
//! Construction goes through `new` (or deserialisation, which routes through
//! the same checks via `serde(try_from)`), so an instance that exists is valid.
//! Adapters never re-check parameters per call.

use serde::{Deserialize, Serialize};

/// A parameter violated its declared constraint.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid parameter `{field}`: {reason}")]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

fn check_min(field: &str, value: usize, min: usize) -> Result<usize, ValidationError> {
    if value < min {
        return Err(ValidationError::new(
            field,
            format!("must be >= {min}, got {value}"),
        ));
    }
    Ok(value)
}

/// Convert a positional float parameter into a period.
///
/// Rejects NaN, infinities, negatives and fractional values rather than
/// truncating them.
pub fn period_from_f64(field: &str, value: f64) -> Result<usize, ValidationError> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 {
        return Err(ValidationError::new(
            field,
            format!("must be a non-negative whole number, got {value}"),
        ));
    }
    Ok(value as usize)
}

// ─── Single-period parameter sets ────────────────────────────────────

/// Wire shape shared by all single-period parameter sets.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawPeriod {
    #[serde(default)]
    period: Option<usize>,
}

macro_rules! period_params {
    ($(#[$meta:meta])* $name:ident, default = $default:expr, min = $min:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(try_from = "RawPeriod")]
        pub struct $name {
            period: usize,
        }

        impl $name {
            pub const DEFAULT_PERIOD: usize = $default;
            pub const MIN_PERIOD: usize = $min;

            pub fn new(period: usize) -> Result<Self, ValidationError> {
                Ok(Self {
                    period: check_min("period", period, Self::MIN_PERIOD)?,
                })
            }

            pub fn period(&self) -> usize {
                self.period
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    period: Self::DEFAULT_PERIOD,
                }
            }
        }

        impl TryFrom<RawPeriod> for $name {
            type Error = ValidationError;

            fn try_from(raw: RawPeriod) -> Result<Self, Self::Error> {
                Self::new(raw.period.unwrap_or(Self::DEFAULT_PERIOD))
            }
        }
    };
}

period_params!(
    /// Relative Strength Index window.
    RsiParams,
    default = 14,
    min = 1
);

period_params!(
    /// Average True Range window.
    AtrParams,
    default = 14,
    min = 1
);

period_params!(
    /// Commodity Channel Index window. A single-bar window has no deviation.
    CciParams,
    default = 20,
    min = 2
);

period_params!(
    /// Simple moving average window.
    MaParams,
    default = 20,
    min = 1
);

period_params!(
    /// Exponential moving average window.
    EmaParams,
    default = 20,
    min = 1
);

// ─── MACD ────────────────────────────────────────────────────────────

/// MACD periods. Requires `fast_period < slow_period`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawMacdParams")]
pub struct MacdParams {
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawMacdParams {
    #[serde(default)]
    fast_period: Option<usize>,
    #[serde(default)]
    slow_period: Option<usize>,
    #[serde(default)]
    signal_period: Option<usize>,
}

impl MacdParams {
    pub const DEFAULT: (usize, usize, usize) = (12, 26, 9);

    pub fn new(
        fast_period: usize,
        slow_period: usize,
        signal_period: usize,
    ) -> Result<Self, ValidationError> {
        let fast_period = check_min("fast_period", fast_period, 1)?;
        let slow_period = check_min("slow_period", slow_period, 1)?;
        let signal_period = check_min("signal_period", signal_period, 1)?;
        if fast_period >= slow_period {
            return Err(ValidationError::new(
                "fast_period",
                format!("must be < slow_period ({slow_period}), got {fast_period}"),
            ));
        }
        Ok(Self {
            fast_period,
            slow_period,
            signal_period,
        })
    }

    pub fn fast_period(&self) -> usize {
        self.fast_period
    }

    pub fn slow_period(&self) -> usize {
        self.slow_period
    }

    pub fn signal_period(&self) -> usize {
        self.signal_period
    }
}

impl Default for MacdParams {
    fn default() -> Self {
        let (fast_period, slow_period, signal_period) = Self::DEFAULT;
        Self {
            fast_period,
            slow_period,
            signal_period,
        }
    }
}

impl TryFrom<RawMacdParams> for MacdParams {
    type Error = ValidationError;

    fn try_from(raw: RawMacdParams) -> Result<Self, Self::Error> {
        let (fast, slow, signal) = Self::DEFAULT;
        Self::new(
            raw.fast_period.unwrap_or(fast),
            raw.slow_period.unwrap_or(slow),
            raw.signal_period.unwrap_or(signal),
        )
    }
}

// ─── Volume profile ──────────────────────────────────────────────────

/// Which price each bar contributes to the volume profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    #[default]
    Close,
    /// (high + low + close) / 3
    Typical,
}

/// How the last day of the input is treated.
///
/// Every day followed by a later day in the input is complete and all of its
/// bars carry the full-day profile (intentional look-ahead). The final day may
/// still be forming, so its treatment is explicit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalDayMode {
    /// Treat the final day as complete: its bars carry the full profile.
    #[default]
    Finalized,
    /// Emit NaN for every bar of the final day.
    Withhold,
    /// Each bar of the final day carries the profile accumulated up to and
    /// including that bar. No look-ahead.
    Progressive,
}

/// Daily volume-profile configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPocParams")]
pub struct PocParams {
    value_area_pct: f64,
    bucket_size: f64,
    utc_offset_minutes: i32,
    price_source: PriceSource,
    final_day: FinalDayMode,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawPocParams {
    #[serde(default)]
    value_area_pct: Option<f64>,
    #[serde(default)]
    bucket_size: Option<f64>,
    #[serde(default)]
    utc_offset_minutes: Option<i32>,
    #[serde(default)]
    price_source: Option<PriceSource>,
    #[serde(default)]
    final_day: Option<FinalDayMode>,
}

impl PocParams {
    pub const DEFAULT_VALUE_AREA_PCT: f64 = 0.7;
    pub const DEFAULT_BUCKET_SIZE: f64 = 0.01;
    const MAX_OFFSET_MINUTES: i32 = 24 * 60 - 1;

    pub fn new(value_area_pct: f64, bucket_size: f64) -> Result<Self, ValidationError> {
        Self::validated(value_area_pct, bucket_size, 0)
    }

    fn validated(
        value_area_pct: f64,
        bucket_size: f64,
        utc_offset_minutes: i32,
    ) -> Result<Self, ValidationError> {
        if !(value_area_pct > 0.0 && value_area_pct <= 1.0) {
            return Err(ValidationError::new(
                "value_area_pct",
                format!("must be in (0, 1], got {value_area_pct}"),
            ));
        }
        if !(bucket_size.is_finite() && bucket_size > 0.0) {
            return Err(ValidationError::new(
                "bucket_size",
                format!("must be a positive finite price step, got {bucket_size}"),
            ));
        }
        if utc_offset_minutes.abs() > Self::MAX_OFFSET_MINUTES {
            return Err(ValidationError::new(
                "utc_offset_minutes",
                format!(
                    "must be within ±{}, got {utc_offset_minutes}",
                    Self::MAX_OFFSET_MINUTES
                ),
            ));
        }
        Ok(Self {
            value_area_pct,
            bucket_size,
            utc_offset_minutes,
            price_source: PriceSource::Close,
            final_day: FinalDayMode::Finalized,
        })
    }

    /// Day boundaries are computed in this fixed offset from UTC.
    pub fn with_utc_offset_minutes(self, minutes: i32) -> Result<Self, ValidationError> {
        let mut next = Self::validated(self.value_area_pct, self.bucket_size, minutes)?;
        next.price_source = self.price_source;
        next.final_day = self.final_day;
        Ok(next)
    }

    pub fn with_price_source(mut self, source: PriceSource) -> Self {
        self.price_source = source;
        self
    }

    pub fn with_final_day(mut self, mode: FinalDayMode) -> Self {
        self.final_day = mode;
        self
    }

    pub fn value_area_pct(&self) -> f64 {
        self.value_area_pct
    }

    pub fn bucket_size(&self) -> f64 {
        self.bucket_size
    }

    pub fn utc_offset_minutes(&self) -> i32 {
        self.utc_offset_minutes
    }

    pub fn price_source(&self) -> PriceSource {
        self.price_source
    }

    pub fn final_day(&self) -> FinalDayMode {
        self.final_day
    }
}

impl Default for PocParams {
    fn default() -> Self {
        Self {
            value_area_pct: Self::DEFAULT_VALUE_AREA_PCT,
            bucket_size: Self::DEFAULT_BUCKET_SIZE,
            utc_offset_minutes: 0,
            price_source: PriceSource::Close,
            final_day: FinalDayMode::Finalized,
        }
    }
}

impl TryFrom<RawPocParams> for PocParams {
    type Error = ValidationError;

    fn try_from(raw: RawPocParams) -> Result<Self, Self::Error> {
        let params = Self::validated(
            raw.value_area_pct.unwrap_or(Self::DEFAULT_VALUE_AREA_PCT),
            raw.bucket_size.unwrap_or(Self::DEFAULT_BUCKET_SIZE),
            raw.utc_offset_minutes.unwrap_or(0),
        )?;
        Ok(params
            .with_price_source(raw.price_source.unwrap_or_default())
            .with_final_day(raw.final_day.unwrap_or_default()))
    }
}
