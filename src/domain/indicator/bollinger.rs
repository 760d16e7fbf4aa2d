//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! Where StdDev is population standard deviation (divides by N, not N-1).
//!
//! Default parameters: period=20, multiplier=2.0
//! Warmup: first (period-1) bars are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::{PriceField, PriceSeries};

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_STDDEV_MULT_X100: u32 = 200;

pub fn calculate_bollinger(
    series: &PriceSeries,
    period: usize,
    stddev_mult_x100: u32,
    source: PriceField,
) -> IndicatorSeries {
    let bars = series.bars();
    let closes = series.values(source);
    let mut values = Vec::with_capacity(bars.len());
    let warmup = period.saturating_sub(1);
    let mult = stddev_mult_x100 as f64 / 100.0;

    for (i, bar) in bars.iter().enumerate() {
        let valid = period > 0 && i >= warmup;

        let (upper, middle, lower) = if valid {
            let window = &closes[i + 1 - period..=i];

            let middle_val: f64 = window.iter().sum::<f64>() / period as f64;
            let variance: f64 = window
                .iter()
                .map(|c| {
                    let diff = c - middle_val;
                    diff * diff
                })
                .sum::<f64>()
                / period as f64;

            let stddev = variance.sqrt();
            (middle_val + mult * stddev, middle_val, middle_val - mult * stddev)
        } else {
            (0.0, 0.0, 0.0)
        };

        values.push(IndicatorPoint {
            timestamp: bar.timestamp,
            valid,
            value: IndicatorValue::Bollinger {
                upper,
                middle,
                lower,
            },
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Bollinger {
            period,
            stddev_mult_x100,
        },
        values,
    }
}

pub fn calculate_bollinger_default(series: &PriceSeries) -> IndicatorSeries {
    calculate_bollinger(
        series,
        DEFAULT_PERIOD,
        DEFAULT_STDDEV_MULT_X100,
        PriceField::Close,
    )
}
