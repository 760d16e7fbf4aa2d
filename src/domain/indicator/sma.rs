//! Simple Moving Average indicator.
//!
//! SMA(n)[i] = mean of the last n source values. Warmup: first (n-1) bars are invalid.

use crate::domain::indicator::rolling::rolling_mean;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::{PriceField, PriceSeries};

pub fn calculate_sma(series: &PriceSeries, period: usize, source: PriceField) -> IndicatorSeries {
    let means = rolling_mean(&series.values(source), period);
    let values = series
        .bars()
        .iter()
        .zip(means)
        .map(|(bar, m)| IndicatorPoint {
            timestamp: bar.timestamp,
            valid: m.is_some(),
            value: IndicatorValue::Simple(m.unwrap_or(0.0)),
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::series_from_closes;

    #[test]
    fn sma_warmup_and_values() {
        let series = calculate_sma(
            &series_from_closes(&[1.0, 2.0, 3.0, 4.0, 5.0]),
            3,
            PriceField::Close,
        );
        assert_eq!(
            series.simple_values(),
            vec![None, None, Some(2.0), Some(3.0), Some(4.0)]
        );
        assert_eq!(series.indicator_type, IndicatorType::Sma(3));
    }

    #[test]
    fn sma_longer_than_series_is_all_invalid() {
        let series = calculate_sma(&series_from_closes(&[1.0, 2.0]), 9, PriceField::Close);
        assert_eq!(series.len(), 2);
        assert_eq!(series.valid_count(), 0);
    }
}
