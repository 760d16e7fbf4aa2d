//! Timestamp alignment across instruments.
//!
//! Only timestamps present in every series are kept (inner join); no
//! interpolation or forward filling.

use crate::domain::indicator::IndicatorSeries;
use crate::domain::ohlcv::PriceSeries;
use chrono::NaiveDateTime;
use std::collections::BTreeSet;

/// A single close observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub timestamp: NaiveDateTime,
    pub price: f64,
}

/// Closes at the timestamps where `indicator` is defined.
pub fn aligned_closes(series: &PriceSeries, indicator: &IndicatorSeries) -> Vec<PricePoint> {
    series
        .bars()
        .iter()
        .zip(&indicator.values)
        .filter(|(bar, point)| point.valid && bar.timestamp == point.timestamp)
        .map(|(bar, _)| PricePoint {
            timestamp: bar.timestamp,
            price: bar.close,
        })
        .collect()
}

/// Timestamps shared by every series, ascending.
pub fn common_timestamps(series: &[&[PricePoint]]) -> Vec<NaiveDateTime> {
    let mut iter = series.iter();
    let Some(first) = iter.next() else {
        return Vec::new();
    };
    let mut common: BTreeSet<NaiveDateTime> = first.iter().map(|p| p.timestamp).collect();
    for s in iter {
        let other: BTreeSet<NaiveDateTime> = s.iter().map(|p| p.timestamp).collect();
        common = common.intersection(&other).copied().collect();
        if common.is_empty() {
            break;
        }
    }
    common.into_iter().collect()
}

/// `price[t] / price[t-1] - 1` for consecutive entries.
pub fn pct_returns(prices: &[f64]) -> Vec<f64> {
    prices.windows(2).map(|w| w[1] / w[0] - 1.0).collect()
}

/// Return columns over the shared timestamps, one column per input series.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnTable {
    /// Timestamp of each return row (the later bar of each pair).
    pub timestamps: Vec<NaiveDateTime>,
    pub columns: Vec<Vec<f64>>,
}

impl ReturnTable {
    pub fn rows(&self) -> usize {
        self.timestamps.len()
    }
}

/// Intersect all series on timestamp, then take percentage returns of the
/// intersected prices. Rows with a non-finite return in any column are
/// dropped.
pub fn build_return_table(series: &[&[PricePoint]]) -> ReturnTable {
    let common = common_timestamps(series);
    let keep: BTreeSet<NaiveDateTime> = common.iter().copied().collect();

    let price_columns: Vec<Vec<f64>> = series
        .iter()
        .map(|s| {
            s.iter()
                .filter(|p| keep.contains(&p.timestamp))
                .map(|p| p.price)
                .collect()
        })
        .collect();
    let return_columns: Vec<Vec<f64>> = price_columns.iter().map(|c| pct_returns(c)).collect();

    let row_count = common.len().saturating_sub(1);
    let finite_rows: Vec<usize> = (0..row_count)
        .filter(|&r| return_columns.iter().all(|c| c[r].is_finite()))
        .collect();

    ReturnTable {
        timestamps: finite_rows.iter().map(|&r| common[r + 1]).collect(),
        columns: return_columns
            .iter()
            .map(|c| finite_rows.iter().map(|&r| c[r]).collect())
            .collect(),
    }
}
