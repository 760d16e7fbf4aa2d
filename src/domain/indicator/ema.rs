//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seed with the SMA of the first n values, then
//! EMA[i] = X[i]*k + EMA[i-1]*(1-k).
//! Warmup: first (n-1) bars are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::{PriceField, PriceSeries};

/// EMA over raw values. `None` before index `period - 1`.
pub fn ema_recurrence(values: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut ema = 0.0;
    let mut sum = 0.0;

    for (i, &x) in values.iter().enumerate() {
        if i < period - 1 {
            sum += x;
            out.push(None);
        } else if i == period - 1 {
            sum += x;
            ema = sum / period as f64;
            out.push(Some(ema));
        } else {
            ema = x * k + ema * (1.0 - k);
            out.push(Some(ema));
        }
    }
    out
}

pub fn calculate_ema(series: &PriceSeries, period: usize, source: PriceField) -> IndicatorSeries {
    let raw = ema_recurrence(&series.values(source), period);
    let values = series
        .bars()
        .iter()
        .zip(raw)
        .map(|(bar, v)| IndicatorPoint {
            timestamp: bar.timestamp,
            valid: v.is_some(),
            value: IndicatorValue::Simple(v.unwrap_or(0.0)),
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Ema(period),
        values,
    }
}
