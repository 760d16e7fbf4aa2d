//! Ichimoku Cloud.
//!
//! - Tenkan-sen: (highest high + lowest low) / 2 over the tenkan period
//! - Kijun-sen: (highest high + lowest low) / 2 over the kijun period
//! - Senkou span A: (tenkan + kijun) / 2
//! - Senkou span B: (highest high + lowest low) / 2 over twice the kijun period
//! - Chikou span: close shifted back by the kijun period
//!
//! Unless `offset` is set, both senkou spans are displaced forward by the kijun
//! period, so the value shown at bar i was computed at bar i - kijun.
//!
//! Default parameters: tenkan=9, kijun=26.

use crate::domain::indicator::rolling::{rolling_max, rolling_min};
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::PriceSeries;

pub const DEFAULT_TENKAN: usize = 9;
pub const DEFAULT_KIJUN: usize = 26;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IchimokuParams {
    pub tenkan: usize,
    pub kijun: usize,
    pub offset: bool,
}

impl Default for IchimokuParams {
    fn default() -> Self {
        Self {
            tenkan: DEFAULT_TENKAN,
            kijun: DEFAULT_KIJUN,
            offset: false,
        }
    }
}

fn midpoints(highs: &[f64], lows: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling_max(highs, window)
        .into_iter()
        .zip(rolling_min(lows, window))
        .map(|(hh, ll)| Some((hh? + ll?) / 2.0))
        .collect()
}

fn shift_forward(values: &[Option<f64>], by: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| if i >= by { values[i - by] } else { None })
        .collect()
}

pub fn calculate_ichimoku(series: &PriceSeries, params: &IchimokuParams) -> IndicatorSeries {
    let highs: Vec<f64> = series.bars().iter().map(|b| b.high).collect();
    let lows: Vec<f64> = series.bars().iter().map(|b| b.low).collect();
    let closes = series.closes();

    let tenkan = midpoints(&highs, &lows, params.tenkan);
    let kijun = midpoints(&highs, &lows, params.kijun);
    let span_a: Vec<Option<f64>> = tenkan
        .iter()
        .zip(&kijun)
        .map(|(t, k)| Some((t.as_ref()? + k.as_ref()?) / 2.0))
        .collect();
    let span_b = midpoints(&highs, &lows, params.kijun * 2);

    let (span_a, span_b) = if params.offset {
        (span_a, span_b)
    } else {
        (
            shift_forward(&span_a, params.kijun),
            shift_forward(&span_b, params.kijun),
        )
    };

    let values = series
        .bars()
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let chikou = closes.get(i + params.kijun).copied();
            let value = IndicatorValue::Ichimoku {
                tenkan: tenkan[i],
                kijun: kijun[i],
                span_a: span_a[i],
                span_b: span_b[i],
                chikou,
            };
            let valid = tenkan[i].is_some()
                || kijun[i].is_some()
                || span_a[i].is_some()
                || span_b[i].is_some()
                || chikou.is_some();
            IndicatorPoint {
                timestamp: bar.timestamp,
                valid,
                value,
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Ichimoku {
            tenkan: params.tenkan,
            kijun: params.kijun,
        },
        values,
    }
}
