//! Factory: converts `IndicatorConfig` into runnable indicators.
//!
//! TA kinds take positional parameters in the order the numeric backend
//! expects them (`MACD: fast, slow, signal`; every other kind: `period`). An
//! empty or absent list means the kind's defaults. The volume profile takes
//! named parameters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::adapters::{TaIndicator, TaSpec};
use crate::domain::Bar;
use crate::indicator::{Indicator, IndicatorError};
use crate::params::{
    period_from_f64, AtrParams, CciParams, EmaParams, MaParams, MacdParams, PocParams,
    RawPocParams, RsiParams, ValidationError,
};
use crate::results::IndicatorOutput;
use crate::volume_profile::VolumeProfile;

// ─── Kind ────────────────────────────────────────────────────────────

/// Every supported indicator kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorKind {
    Atr,
    Cci,
    Macd,
    Rsi,
    Ma,
    Ema,
    Poc,
}

impl IndicatorKind {
    pub const ALL: [IndicatorKind; 7] = [
        IndicatorKind::Atr,
        IndicatorKind::Cci,
        IndicatorKind::Macd,
        IndicatorKind::Rsi,
        IndicatorKind::Ma,
        IndicatorKind::Ema,
        IndicatorKind::Poc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorKind::Atr => "ATR",
            IndicatorKind::Cci => "CCI",
            IndicatorKind::Macd => "MACD",
            IndicatorKind::Rsi => "RSI",
            IndicatorKind::Ma => "MA",
            IndicatorKind::Ema => "EMA",
            IndicatorKind::Poc => "POC",
        }
    }

    /// Positional parameter names, in order. Empty for named-parameter kinds.
    pub fn positional_params(&self) -> &'static [&'static str] {
        match self {
            IndicatorKind::Macd => &["fast_period", "slow_period", "signal_period"],
            IndicatorKind::Poc => &[],
            _ => &["period"],
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndicatorKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        IndicatorKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == upper)
            .ok_or_else(|| {
                let names: Vec<&str> = IndicatorKind::ALL.iter().map(|k| k.as_str()).collect();
                ValidationError::new(
                    "name",
                    format!("unsupported indicator `{s}`, must be one of {}", names.join("/")),
                )
            })
    }
}

// ─── Config ──────────────────────────────────────────────────────────

/// Serializable description of one indicator instance.
///
/// ```toml
/// [[indicators]]
/// name = "MACD"
/// params = [12, 26, 9]
///
/// [[indicators]]
/// name = "poc"
/// params = { value_area_pct = 0.68, bucket_size = 0.5 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub params: Value,
}

impl IndicatorConfig {
    pub fn new(name: impl Into<String>, params: Value) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    /// A TA config with positional parameters.
    pub fn positional(name: impl Into<String>, params: &[f64]) -> Self {
        Self::new(name, Value::from(params.to_vec()))
    }

    /// Default parameters for `kind`.
    pub fn defaults(kind: IndicatorKind) -> Self {
        Self::new(kind.as_str(), Value::Null)
    }
}

// ─── Factory ─────────────────────────────────────────────────────────

/// Build an indicator from its config. All parameter checks happen here.
pub fn build(config: &IndicatorConfig) -> Result<AnyIndicator, ValidationError> {
    let kind: IndicatorKind = config.name.parse()?;
    let indicator = match kind {
        IndicatorKind::Poc => AnyIndicator::VolumeProfile(VolumeProfile::new(poc_params(
            &config.params,
        )?)),
        _ => AnyIndicator::Ta(TaIndicator::new(ta_spec(
            kind,
            &positional_args(kind, &config.params)?,
        )?)),
    };
    tracing::debug!(kind = %kind, indicator = indicator.name(), "indicator built");
    Ok(indicator)
}

fn positional_args(kind: IndicatorKind, params: &Value) -> Result<Vec<f64>, ValidationError> {
    let items = match params {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items,
        other => {
            return Err(ValidationError::new(
                "params",
                format!("{kind} takes a list of numbers, got {other}"),
            ))
        }
    };
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.as_f64().ok_or_else(|| {
                let field = kind.positional_params().get(i).copied().unwrap_or("params");
                ValidationError::new(field, format!("must be a number, got {item}"))
            })
        })
        .collect()
}

/// Turn positional arguments into a validated `TaSpec`. Empty means defaults.
pub fn ta_spec(kind: IndicatorKind, args: &[f64]) -> Result<TaSpec, ValidationError> {
    let names = kind.positional_params();
    if names.is_empty() {
        return Err(ValidationError::new(
            "params",
            format!("{kind} does not take positional parameters"),
        ));
    }
    if !args.is_empty() && args.len() != names.len() {
        return Err(ValidationError::new(
            "params",
            format!(
                "{kind} expects {} value(s) ({}), got {}",
                names.len(),
                names.join(", "),
                args.len()
            ),
        ));
    }

    let arg = |i: usize| period_from_f64(names[i], args[i]);
    let period = |default: usize| {
        if args.is_empty() {
            Ok(default)
        } else {
            arg(0)
        }
    };

    Ok(match kind {
        IndicatorKind::Macd => {
            let (fast, slow, signal) = if args.is_empty() {
                MacdParams::DEFAULT
            } else {
                (arg(0)?, arg(1)?, arg(2)?)
            };
            TaSpec::Macd(MacdParams::new(fast, slow, signal)?)
        }
        IndicatorKind::Rsi => TaSpec::Rsi(RsiParams::new(period(RsiParams::DEFAULT_PERIOD)?)?),
        IndicatorKind::Atr => TaSpec::Atr(AtrParams::new(period(AtrParams::DEFAULT_PERIOD)?)?),
        IndicatorKind::Cci => TaSpec::Cci(CciParams::new(period(CciParams::DEFAULT_PERIOD)?)?),
        IndicatorKind::Ma => TaSpec::Ma(MaParams::new(period(MaParams::DEFAULT_PERIOD)?)?),
        IndicatorKind::Ema => TaSpec::Ema(EmaParams::new(period(EmaParams::DEFAULT_PERIOD)?)?),
        IndicatorKind::Poc => {
            return Err(ValidationError::new(
                "params",
                "POC does not take positional parameters",
            ))
        }
    })
}

fn poc_params(params: &Value) -> Result<PocParams, ValidationError> {
    match params {
        Value::Null => Ok(PocParams::default()),
        Value::Object(_) => {
            let raw: RawPocParams = serde_json::from_value(params.clone())
                .map_err(|e| ValidationError::new("params", e.to_string()))?;
            PocParams::try_from(raw)
        }
        other => Err(ValidationError::new(
            "params",
            format!("POC takes named parameters, got {other}"),
        )),
    }
}

// ─── AnyIndicator ────────────────────────────────────────────────────

/// Any indicator the factory can build.
#[derive(Debug, Clone)]
pub enum AnyIndicator {
    Ta(TaIndicator),
    VolumeProfile(VolumeProfile),
}

impl AnyIndicator {
    pub fn kind(&self) -> IndicatorKind {
        match self {
            AnyIndicator::Ta(ta) => match ta.spec() {
                TaSpec::Macd(_) => IndicatorKind::Macd,
                TaSpec::Rsi(_) => IndicatorKind::Rsi,
                TaSpec::Atr(_) => IndicatorKind::Atr,
                TaSpec::Cci(_) => IndicatorKind::Cci,
                TaSpec::Ma(_) => IndicatorKind::Ma,
                TaSpec::Ema(_) => IndicatorKind::Ema,
            },
            AnyIndicator::VolumeProfile(_) => IndicatorKind::Poc,
        }
    }
}

impl Indicator for AnyIndicator {
    type Output = IndicatorOutput;

    fn name(&self) -> &str {
        match self {
            AnyIndicator::Ta(ind) => ind.name(),
            AnyIndicator::VolumeProfile(ind) => ind.name(),
        }
    }

    fn lookback(&self) -> usize {
        match self {
            AnyIndicator::Ta(ind) => ind.lookback(),
            AnyIndicator::VolumeProfile(ind) => ind.lookback(),
        }
    }

    fn describe_purpose(&self) -> String {
        match self {
            AnyIndicator::Ta(ind) => ind.describe_purpose(),
            AnyIndicator::VolumeProfile(ind) => ind.describe_purpose(),
        }
    }

    fn describe_params(&self) -> String {
        match self {
            AnyIndicator::Ta(ind) => ind.describe_params(),
            AnyIndicator::VolumeProfile(ind) => ind.describe_params(),
        }
    }

    fn describe_output(&self) -> String {
        match self {
            AnyIndicator::Ta(ind) => ind.describe_output(),
            AnyIndicator::VolumeProfile(ind) => ind.describe_output(),
        }
    }

    fn on_bars(&self, bars: &[Bar]) -> Result<Vec<IndicatorOutput>, IndicatorError> {
        match self {
            AnyIndicator::Ta(ind) => ind.on_bars(bars),
            AnyIndicator::VolumeProfile(ind) => Ok(ind
                .on_bars(bars)?
                .into_iter()
                .map(IndicatorOutput::Poc)
                .collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_names_are_case_insensitive() {
        assert_eq!("macd".parse::<IndicatorKind>().unwrap(), IndicatorKind::Macd);
        assert_eq!(" Ema ".parse::<IndicatorKind>().unwrap(), IndicatorKind::Ema);
        let err = "vwap".parse::<IndicatorKind>().unwrap_err();
        assert_eq!(err.field, "name");
        assert!(err.reason.contains("MACD"));
    }

    #[test]
    fn empty_params_mean_defaults() {
        let ind = build(&IndicatorConfig::defaults(IndicatorKind::Macd)).unwrap();
        assert_eq!(ind.name(), "macd_12_26_9");
        assert_eq!(ind.lookback(), 33);

        let ind = build(&IndicatorConfig::new("cci", json!([]))).unwrap();
        assert_eq!(ind.name(), "cci_20");
    }

    #[test]
    fn positional_params_are_validated() {
        let err = build(&IndicatorConfig::positional("MACD", &[12.0, 0.0, 9.0])).unwrap_err();
        assert_eq!(err.field, "slow_period");

        let err = build(&IndicatorConfig::positional("RSI", &[14.5])).unwrap_err();
        assert_eq!(err.field, "period");

        let err = build(&IndicatorConfig::positional("MACD", &[12.0, 26.0])).unwrap_err();
        assert_eq!(err.field, "params");

        let err = build(&IndicatorConfig::new("ATR", json!(["x"]))).unwrap_err();
        assert_eq!(err.field, "period");
    }

    #[test]
    fn poc_takes_named_params() {
        let ind = build(&IndicatorConfig::new(
            "POC",
            json!({"value_area_pct": 0.5, "bucket_size": 0.25, "final_day": "withhold"}),
        ))
        .unwrap();
        assert_eq!(ind.kind(), IndicatorKind::Poc);
        match ind {
            AnyIndicator::VolumeProfile(vp) => {
                assert_eq!(vp.params().value_area_pct(), 0.5);
                assert_eq!(vp.params().bucket_size(), 0.25);
            }
            other => panic!("expected volume profile, got {other:?}"),
        }

        let err = build(&IndicatorConfig::new("POC", json!({"value_area_pct": 0.0}))).unwrap_err();
        assert_eq!(err.field, "value_area_pct");

        let err = build(&IndicatorConfig::positional("POC", &[0.7])).unwrap_err();
        assert_eq!(err.field, "params");
    }

    #[test]
    fn config_reads_from_toml() {
        #[derive(Deserialize)]
        struct File {
            indicators: Vec<IndicatorConfig>,
        }
        let file: File = toml::from_str(
            r#"
            [[indicators]]
            name = "ema"
            params = [10]

            [[indicators]]
            name = "POC"
            params = { bucket_size = 0.5 }
            "#,
        )
        .unwrap();
        let kinds: Vec<IndicatorKind> = file
            .indicators
            .iter()
            .map(|c| build(c).unwrap().kind())
            .collect();
        assert_eq!(kinds, vec![IndicatorKind::Ema, IndicatorKind::Poc]);
    }

    #[test]
    fn every_kind_builds_with_defaults() {
        for kind in IndicatorKind::ALL {
            let ind = build(&IndicatorConfig::defaults(kind)).unwrap();
            assert_eq!(ind.kind(), kind);
            assert!(!ind.describe_purpose().is_empty());
            assert_eq!(ind.version(), "1.0.0");
        }
    }
}
