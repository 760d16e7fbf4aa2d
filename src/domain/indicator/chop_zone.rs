//! Chop Zone trend-angle oscillator.
//!
//! Classifies the angle of an EMA, scaled by the recent price range, into one
//! of nine zones:
//!
//! ```text
//! TP        = (H + L + C) / 3
//! rangeHL   = 25 / (max(src, n) - min(src, n)) * min(src, n)
//! slope     = (EMA[i-1] - EMA[i]) / TP * rangeHL
//! magnitude = round(degrees(acos(1 / sqrt(1 + slope^2))))
//! angle     = -magnitude if slope > 0 else magnitude
//! ```
//!
//! Zones: >=5 -> 0, >=3.57 -> 1, >=2.14 -> 2, >=0.71 -> 3, <=-5 -> 4,
//! <=-3.57 -> 5, <=-2.14 -> 6, <=-0.71 -> 7, otherwise 8.
//!
//! Warmup: first max(n, ema_n) bars are invalid. Points whose intermediate
//! values are not finite (flat range window, zero typical price) are invalid
//! as well.

use crate::domain::indicator::rolling::{rolling_max, rolling_min};
use crate::domain::indicator::{
    ema_recurrence, IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue,
};
use crate::domain::ohlcv::{PriceField, PriceSeries};

pub const DEFAULT_LENGTH: usize = 30;
pub const DEFAULT_EMA_LENGTH: usize = 34;
pub const ZONE_COUNT: u8 = 9;

const RANGE_SCALE: f64 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChopZoneParams {
    pub length: usize,
    pub ema_length: usize,
    pub source: PriceField,
}

impl Default for ChopZoneParams {
    fn default() -> Self {
        Self {
            length: DEFAULT_LENGTH,
            ema_length: DEFAULT_EMA_LENGTH,
            source: PriceField::Close,
        }
    }
}

impl ChopZoneParams {
    /// Number of leading bars that are always invalid.
    pub fn warmup(&self) -> usize {
        self.length.max(self.ema_length)
    }

    /// Shortest series that yields at least one defined zone.
    pub fn min_bars(&self) -> usize {
        self.warmup() + 1
    }
}

pub fn calculate_chop_zone(series: &PriceSeries, params: &ChopZoneParams) -> IndicatorSeries {
    let indicator_type = IndicatorType::ChopZone {
        length: params.length,
        ema_length: params.ema_length,
    };
    let bars = series.bars();
    let warmup = params.warmup();

    if params.length == 0 || params.ema_length == 0 || bars.len() < params.min_bars() {
        return IndicatorSeries {
            indicator_type,
            values: bars
                .iter()
                .map(|b| IndicatorPoint {
                    timestamp: b.timestamp,
                    valid: false,
                    value: IndicatorValue::Zone(0),
                })
                .collect(),
        };
    }

    let source = series.values(params.source);
    let highest = rolling_max(&source, params.length);
    let lowest = rolling_min(&source, params.length);
    let ema = ema_recurrence(&source, params.ema_length);

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let zone = if i < warmup {
                None
            } else {
                zone_at(
                    bar.typical_price(),
                    highest[i],
                    lowest[i],
                    ema[i - 1],
                    ema[i],
                )
            };
            IndicatorPoint {
                timestamp: bar.timestamp,
                valid: zone.is_some(),
                value: IndicatorValue::Zone(zone.unwrap_or(0)),
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}

fn zone_at(
    typical: f64,
    highest: Option<f64>,
    lowest: Option<f64>,
    prev_ema: Option<f64>,
    ema: Option<f64>,
) -> Option<u8> {
    let (hi, lo, prev, cur) = (highest?, lowest?, prev_ema?, ema?);
    let range = RANGE_SCALE / (hi - lo) * lo;
    if !range.is_finite() {
        return None;
    }
    let slope = (prev - cur) / typical * range;
    classify_angle(trend_angle(slope)?)
}

/// Signed, whole-degree angle of a slope. `None` for a non-finite slope.
///
/// The magnitude is rounded half-to-even before the sign is applied.
pub fn trend_angle(slope: f64) -> Option<f64> {
    if !slope.is_finite() {
        return None;
    }
    let hypot = (1.0 + slope * slope).sqrt();
    let magnitude = (1.0 / hypot).acos().to_degrees().round_ties_even();
    if !magnitude.is_finite() {
        return None;
    }
    Some(if slope > 0.0 { -magnitude } else { magnitude })
}

/// Map an angle to its zone. `None` for NaN or infinite input.
pub fn classify_angle(angle: f64) -> Option<u8> {
    if !angle.is_finite() {
        return None;
    }
    let zone = if angle >= 5.0 {
        0
    } else if angle >= 3.57 {
        1
    } else if angle >= 2.14 {
        2
    } else if angle >= 0.71 {
        3
    } else if angle <= -5.0 {
        4
    } else if angle <= -3.57 {
        5
    } else if angle <= -2.14 {
        6
    } else if angle <= -0.71 {
        7
    } else {
        8
    };
    Some(zone)
}

/// Display colour for a zone.
pub fn zone_colour(zone: u8) -> &'static str {
    match zone {
        0 => "#26C6DA",
        1 => "#43A047",
        2 => "#A5D6A7",
        3 => "#009688",
        4 => "#D50000",
        5 => "#E91E63",
        6 => "#FF6D00",
        7 => "#FFB74D",
        _ => "#FDD835",
    }
}
