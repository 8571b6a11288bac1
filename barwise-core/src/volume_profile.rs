//! Daily volume profile: point of control (POC) and value area (VAH/VAL).
//!
//! Bars are grouped into days by the calendar date of their timestamp in a
//! fixed UTC offset. A day is a consecutive run of bars sharing a date. Within
//! a day each bar adds its volume to the price bucket
//! `floor(price / bucket_size)`; a bucket's price is `index * bucket_size`.
//!
//! - POC: bucket with the most volume. Ties go to the bucket nearest the day's
//!   VWAP, then to the lower price.
//! - Value area: starting from the POC, take occupied buckets in descending
//!   volume order until they hold `value_area_pct` of the day's volume. VAH
//!   and VAL are the highest and lowest bucket prices taken. Empty buckets
//!   are never visited, so a stray far-off print costs nothing extra.
//!
//! Bars with a non-finite price or non-positive volume contribute nothing.
//! A day without volume yields NaN.
//!
//! # Look-ahead
//! Every bar of a completed day carries that day's full profile, including
//! bars that precede the day's high-volume prints. A day is complete once a
//! later day appears in the input. The final day follows
//! [`FinalDayMode`](crate::params::FinalDayMode).

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate};

use crate::domain::{Bar, SchemaError, SchemaErrorKind};
use crate::indicator::{Indicator, IndicatorError};
use crate::params::{FinalDayMode, PocParams, PriceSource, ValidationError};
use crate::results::PocResult;

/// Relative slack when flooring to a bucket index; absorbs float noise such
/// as 0.15 / 0.01 = 14.999...
const BUCKET_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone)]
pub struct VolumeProfile {
    params: PocParams,
    name: String,
}

impl VolumeProfile {
    pub fn new(params: PocParams) -> Self {
        Self {
            name: format!("poc_{}", params.value_area_pct()),
            params,
        }
    }

    pub fn params(&self) -> &PocParams {
        &self.params
    }

    fn price(&self, bar: &Bar) -> f64 {
        match self.params.price_source() {
            PriceSource::Close => bar.close,
            PriceSource::Typical => bar.typical_price(),
        }
    }

    fn offset(&self) -> Result<FixedOffset, ValidationError> {
        let minutes = self.params.utc_offset_minutes();
        FixedOffset::east_opt(minutes * 60).ok_or_else(|| {
            ValidationError::new("utc_offset_minutes", format!("unsupported offset {minutes}"))
        })
    }

    /// Index ranges of consecutive bars sharing a calendar day.
    fn day_runs(&self, bars: &[Bar]) -> Result<Vec<std::ops::Range<usize>>, IndicatorError> {
        let offset = self.offset()?;
        let mut runs = Vec::new();
        let mut current: Option<(NaiveDate, usize)> = None;

        for (index, bar) in bars.iter().enumerate() {
            let day = DateTime::from_timestamp_millis(bar.timestamp)
                .ok_or(SchemaError {
                    index,
                    kind: SchemaErrorKind::TimestampOutOfRange(bar.timestamp),
                })?
                .with_timezone(&offset)
                .date_naive();

            match current {
                Some((open_day, _)) if open_day == day => {}
                Some((_, start)) => {
                    runs.push(start..index);
                    current = Some((day, index));
                }
                None => current = Some((day, index)),
            }
        }
        if let Some((_, start)) = current {
            runs.push(start..bars.len());
        }
        Ok(runs)
    }

    fn profile(&self, bars: &[Bar]) -> DayProfile {
        let mut profile = DayProfile::new(self.params.bucket_size());
        for bar in bars {
            profile.add(self.price(bar), bar.volume);
        }
        profile
    }
}

impl Indicator for VolumeProfile {
    type Output = PocResult;

    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn describe_purpose(&self) -> String {
        "Per-day volume profile: the point of control (price bucket with the most volume) and \
         the value-area high/low around it. Days reset on calendar-date change in the \
         configured UTC offset."
            .to_string()
    }

    fn describe_params(&self) -> String {
        format!(
            "value_area_pct (0, 1] = {}, bucket_size (> 0) = {}, utc_offset_minutes = {}, \
             price_source (close|typical) = {:?}, final_day (finalized|withhold|progressive) = {:?}.",
            self.params.value_area_pct(),
            self.params.bucket_size(),
            self.params.utc_offset_minutes(),
            self.params.price_source(),
            self.params.final_day()
        )
    }

    fn describe_output(&self) -> String {
        "One row per bar: {timestamp, poc, vah, val}. Every bar of a completed day carries the \
         whole day's profile. Bars of the final day follow final_day. Days without volume are NaN."
            .to_string()
    }

    fn on_bars(&self, bars: &[Bar]) -> Result<Vec<PocResult>, IndicatorError> {
        if bars.is_empty() {
            return Ok(Vec::new());
        }

        let runs = self.day_runs(bars)?;
        let last = runs.len() - 1;
        let pct = self.params.value_area_pct();
        let mut rows = Vec::with_capacity(bars.len());

        for (i, run) in runs.into_iter().enumerate() {
            let day = &bars[run];
            let mode = if i == last {
                self.params.final_day()
            } else {
                FinalDayMode::Finalized
            };

            match mode {
                FinalDayMode::Finalized => {
                    let levels = self.profile(day).levels(pct);
                    rows.extend(day.iter().map(|bar| levels.row(bar.timestamp)));
                }
                FinalDayMode::Withhold => {
                    rows.extend(day.iter().map(|bar| Levels::NAN.row(bar.timestamp)));
                }
                FinalDayMode::Progressive => {
                    let mut profile = DayProfile::new(self.params.bucket_size());
                    for bar in day {
                        profile.add(self.price(bar), bar.volume);
                        rows.push(profile.levels(pct).row(bar.timestamp));
                    }
                }
            }
        }

        tracing::debug!(bars = bars.len(), days = last + 1, "volume profile computed");
        Ok(rows)
    }
}

// ─── Day profile ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
struct Levels {
    poc: f64,
    vah: f64,
    val: f64,
}

impl Levels {
    const NAN: Levels = Levels {
        poc: f64::NAN,
        vah: f64::NAN,
        val: f64::NAN,
    };

    fn row(&self, timestamp: i64) -> PocResult {
        PocResult {
            timestamp,
            poc: self.poc,
            vah: self.vah,
            val: self.val,
        }
    }
}

/// Volume per price bucket for one day.
#[derive(Debug, Clone)]
struct DayProfile {
    bucket_size: f64,
    /// `1 / bucket_size` when that is a whole number, so decimal sizes
    /// (0.01, 0.1, 0.5) map indices back to prices by exact division.
    buckets_per_unit: Option<f64>,
    buckets: BTreeMap<i64, f64>,
    total_volume: f64,
    price_volume: f64,
}

impl DayProfile {
    fn new(bucket_size: f64) -> Self {
        let per_unit = bucket_size.recip();
        let buckets_per_unit = (per_unit >= 1.0 && (per_unit - per_unit.round()).abs() < 1e-9)
            .then(|| per_unit.round());
        Self {
            bucket_size,
            buckets_per_unit,
            buckets: BTreeMap::new(),
            total_volume: 0.0,
            price_volume: 0.0,
        }
    }

    fn add(&mut self, price: f64, volume: f64) {
        if !price.is_finite() || !volume.is_finite() || volume <= 0.0 {
            return;
        }
        let index = self.bucket_index(price);
        *self.buckets.entry(index).or_insert(0.0) += volume;
        self.total_volume += volume;
        self.price_volume += price * volume;
    }

    /// Price in bucket units.
    fn scaled(&self, price: f64) -> f64 {
        match self.buckets_per_unit {
            Some(per_unit) => price * per_unit,
            None => price / self.bucket_size,
        }
    }

    fn bucket_index(&self, price: f64) -> i64 {
        let scaled = self.scaled(price);
        (scaled + BUCKET_EPSILON * scaled.abs().max(1.0)).floor() as i64
    }

    fn bucket_price(&self, index: i64) -> f64 {
        match self.buckets_per_unit {
            Some(per_unit) => index as f64 / per_unit,
            None => index as f64 * self.bucket_size,
        }
    }

    /// Highest-volume bucket. Distances to the VWAP are measured in bucket
    /// units, and ones closer than `TIE_TOLERANCE` count as equal, so a
    /// symmetric tie falls to the lower bucket.
    fn point_of_control(&self) -> Option<i64> {
        const TIE_TOLERANCE: f64 = 1e-6;

        let vwap_index = self.scaled(self.price_volume / self.total_volume);
        let mut best: Option<(i64, f64, f64)> = None;

        // Ascending order: on a full tie the first (lower) bucket stays.
        for (&index, &volume) in &self.buckets {
            let distance = (index as f64 - vwap_index).abs();
            let better = match best {
                None => true,
                Some((_, best_volume, best_distance)) => {
                    volume > best_volume
                        || (volume == best_volume && distance < best_distance - TIE_TOLERANCE)
                }
            };
            if better {
                best = Some((index, volume, distance));
            }
        }
        best.map(|(index, _, _)| index)
    }

    /// POC plus the value area: occupied buckets are taken in descending
    /// volume order (nearer the POC first on equal volume, then lower) until
    /// they hold `value_area_pct` of the day. VAH/VAL are the outermost
    /// buckets taken.
    fn levels(&self, value_area_pct: f64) -> Levels {
        if self.total_volume <= 0.0 {
            return Levels::NAN;
        }
        let Some(poc) = self.point_of_control() else {
            return Levels::NAN;
        };

        let mut rest: Vec<(i64, f64)> = self
            .buckets
            .iter()
            .filter(|(&index, _)| index != poc)
            .map(|(&index, &volume)| (index, volume))
            .collect();
        rest.sort_by(|a, b| {
            b.1.total_cmp(&a.1)
                .then_with(|| a.0.abs_diff(poc).cmp(&b.0.abs_diff(poc)))
                .then_with(|| a.0.cmp(&b.0))
        });

        let target = self.total_volume * value_area_pct;
        let mut covered = self.buckets.get(&poc).copied().unwrap_or(0.0);
        let (mut low, mut high) = (poc, poc);
        for (index, volume) in rest {
            if covered >= target {
                break;
            }
            low = low.min(index);
            high = high.max(index);
            covered += volume;
        }

        Levels {
            poc: self.bucket_price(poc),
            vah: self.bucket_price(high),
            val: self.bucket_price(low),
        }
    }
}
