//! Barwise Core: timestamp-aligned technical-analysis indicator adapters.
//!
//! This crate contains:
//! - Domain types (bars) and the untyped row boundary with schema validation
//! - Validated, immutable parameter sets for every indicator kind
//! - The result contract (`IndicatorResult`) and the closed `IndicatorOutput` sum type
//! - The numeric backend seam (`TaBackend`) with a native TA-Lib-compatible kernel set
//! - Indicator adapters (MACD, RSI, ATR, CCI, MA, EMA) and the daily volume profile
//! - A factory that turns `IndicatorConfig` into runnable indicators

pub mod adapters;
pub mod backend;
pub mod domain;
pub mod factory;
pub mod indicator;
pub mod kernels;
pub mod params;
pub mod results;
pub mod volume_profile;

pub use adapters::{
    AtrIndicator, CciIndicator, EmaIndicator, MaIndicator, MacdIndicator, RsiIndicator,
    TaIndicator, TaSpec,
};
pub use backend::{BackendError, MacdSeries, NativeBackend, TaBackend};
pub use domain::{parse_rows, Bar, BarRow, SchemaError, SchemaErrorKind};
pub use factory::{build, AnyIndicator, IndicatorConfig, IndicatorKind};
pub use indicator::{ComputationError, Indicator, IndicatorError, Scoped};
pub use params::{
    AtrParams, CciParams, EmaParams, FinalDayMode, MaParams, MacdParams, PocParams, PriceSource,
    RsiParams, ValidationError,
};
pub use results::{
    AtrResult, CciResult, IndicatorOutput, IndicatorResult, MaResult, MacdResult, PocResult,
    RsiResult,
};
pub use volume_profile::VolumeProfile;
