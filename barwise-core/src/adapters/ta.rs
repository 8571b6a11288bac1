//! Single-type dispatcher over the TA adapters.
//!
//! `TaSpec` names one TA kind together with its validated parameters;
//! `TaIndicator` builds the matching adapter once and forwards to it, wrapping
//! each row in `IndicatorOutput`.

use crate::backend::{NativeBackend, TaBackend};
use crate::domain::Bar;
use crate::indicator::{Indicator, IndicatorError};
use crate::params::{AtrParams, CciParams, EmaParams, MaParams, MacdParams, RsiParams};
use crate::results::IndicatorOutput;

use super::{AtrIndicator, CciIndicator, EmaIndicator, MaIndicator, MacdIndicator, RsiIndicator};

/// One TA kind with its parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TaSpec {
    Macd(MacdParams),
    Rsi(RsiParams),
    Atr(AtrParams),
    Cci(CciParams),
    Ma(MaParams),
    Ema(EmaParams),
}

#[derive(Debug, Clone)]
enum Adapter<B> {
    Macd(MacdIndicator<B>),
    Rsi(RsiIndicator<B>),
    Atr(AtrIndicator<B>),
    Cci(CciIndicator<B>),
    Ma(MaIndicator<B>),
    Ema(EmaIndicator<B>),
}

macro_rules! each_adapter {
    ($adapter:expr, $ind:ident => $body:expr) => {
        match $adapter {
            Adapter::Macd($ind) => $body,
            Adapter::Rsi($ind) => $body,
            Adapter::Atr($ind) => $body,
            Adapter::Cci($ind) => $body,
            Adapter::Ma($ind) => $body,
            Adapter::Ema($ind) => $body,
        }
    };
}

#[derive(Debug, Clone)]
pub struct TaIndicator<B = NativeBackend> {
    spec: TaSpec,
    adapter: Adapter<B>,
}

impl TaIndicator {
    pub fn new(spec: TaSpec) -> Self {
        Self::with_backend(spec, NativeBackend)
    }
}

impl<B: TaBackend> TaIndicator<B> {
    pub fn with_backend(spec: TaSpec, backend: B) -> Self {
        let adapter = match spec {
            TaSpec::Macd(p) => Adapter::Macd(MacdIndicator::with_backend(p, backend)),
            TaSpec::Rsi(p) => Adapter::Rsi(RsiIndicator::with_backend(p, backend)),
            TaSpec::Atr(p) => Adapter::Atr(AtrIndicator::with_backend(p, backend)),
            TaSpec::Cci(p) => Adapter::Cci(CciIndicator::with_backend(p, backend)),
            TaSpec::Ma(p) => Adapter::Ma(MaIndicator::with_backend(p, backend)),
            TaSpec::Ema(p) => Adapter::Ema(EmaIndicator::with_backend(p, backend)),
        };
        Self { spec, adapter }
    }

    pub fn spec(&self) -> &TaSpec {
        &self.spec
    }
}

impl<B: TaBackend> Indicator for TaIndicator<B> {
    type Output = IndicatorOutput;

    fn name(&self) -> &str {
        each_adapter!(&self.adapter, ind => ind.name())
    }

    fn lookback(&self) -> usize {
        each_adapter!(&self.adapter, ind => ind.lookback())
    }

    fn describe_purpose(&self) -> String {
        each_adapter!(&self.adapter, ind => ind.describe_purpose())
    }

    fn describe_params(&self) -> String {
        each_adapter!(&self.adapter, ind => ind.describe_params())
    }

    fn describe_output(&self) -> String {
        each_adapter!(&self.adapter, ind => ind.describe_output())
    }

    fn on_bars(&self, bars: &[Bar]) -> Result<Vec<IndicatorOutput>, IndicatorError> {
        let rows = match &self.adapter {
            Adapter::Macd(ind) => wrap(ind.on_bars(bars)?, IndicatorOutput::Macd),
            Adapter::Rsi(ind) => wrap(ind.on_bars(bars)?, IndicatorOutput::Rsi),
            Adapter::Atr(ind) => wrap(ind.on_bars(bars)?, IndicatorOutput::Atr),
            Adapter::Cci(ind) => wrap(ind.on_bars(bars)?, IndicatorOutput::Cci),
            Adapter::Ma(ind) => wrap(ind.on_bars(bars)?, IndicatorOutput::Ma),
            Adapter::Ema(ind) => wrap(ind.on_bars(bars)?, IndicatorOutput::Ema),
        };
        Ok(rows)
    }
}

fn wrap<R>(rows: Vec<R>, variant: fn(R) -> IndicatorOutput) -> Vec<IndicatorOutput> {
    rows.into_iter().map(variant).collect()
}
