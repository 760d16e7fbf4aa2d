//! Autoregressive price forecast, ARIMA(p, 1, 0).
//!
//! The source column is differenced once and an AR(p) model with intercept
//! is fitted to the differences by conditional least squares. Forecast
//! differences are produced recursively and integrated back onto the last
//! observed price. If the normal equations are singular for order p, the
//! order is reduced until they are not; order 0 is the mean difference
//! (a drift model) and always fits.

use crate::domain::interval::Interval;
use crate::domain::ohlcv::{PriceField, PriceSeries};
use chrono::NaiveDateTime;

pub const MIN_POINTS: usize = 20;
pub const DEFAULT_ORDER: usize = 5;

const PIVOT_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastPoint {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ForecastError {
    #[error("at least {need} data points are required for the forecast, have {have}")]
    InsufficientData { have: usize, need: usize },

    #[error("non-finite value in input at index {index}")]
    NonFinite { index: usize },
}

/// Fitted AR model on first differences.
#[derive(Debug, Clone, PartialEq)]
pub struct ArModel {
    pub intercept: f64,
    /// `coefficients[k]` multiplies the difference lagged by `k + 1`.
    pub coefficients: Vec<f64>,
}

impl ArModel {
    pub fn order(&self) -> usize {
        self.coefficients.len()
    }

    /// Fit by least squares, falling back to lower orders on a singular system.
    pub fn fit(values: &[f64], max_order: usize) -> Self {
        let max_order = max_order.min(values.len().saturating_sub(2));
        for order in (1..=max_order).rev() {
            if let Some(model) = Self::fit_order(values, order) {
                return model;
            }
            tracing::debug!(order, "singular AR system, reducing order");
        }
        let mean = if values.is_empty() {
            0.0
        } else {
            values.iter().sum::<f64>() / values.len() as f64
        };
        Self {
            intercept: mean,
            coefficients: Vec::new(),
        }
    }

    fn fit_order(values: &[f64], order: usize) -> Option<Self> {
        let k = order + 1;
        let mut xtx = vec![vec![0.0; k]; k];
        let mut xty = vec![0.0; k];

        for t in order..values.len() {
            let mut row = Vec::with_capacity(k);
            row.push(1.0);
            row.extend((1..=order).map(|lag| values[t - lag]));
            for i in 0..k {
                xty[i] += row[i] * values[t];
                for j in 0..k {
                    xtx[i][j] += row[i] * row[j];
                }
            }
        }

        let beta = solve(xtx, xty)?;
        Some(Self {
            intercept: beta[0],
            coefficients: beta[1..].to_vec(),
        })
    }

    /// One-step prediction given history ordered oldest to newest.
    pub fn predict_next(&self, history: &[f64]) -> f64 {
        let n = history.len();
        self.intercept
            + self
                .coefficients
                .iter()
                .enumerate()
                .filter(|(lag, _)| *lag < n)
                .map(|(lag, c)| c * history[n - 1 - lag])
                .sum::<f64>()
    }
}

/// Solve `a * x = b` by Gaussian elimination with partial pivoting.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();
    let scale = a
        .iter()
        .flat_map(|r| r.iter())
        .fold(0.0_f64, |m, v| m.max(v.abs()))
        .max(1.0);

    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot][col].abs() <= PIVOT_EPSILON * scale {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            for c in col..n {
                a[row][c] -= factor * a[col][c];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = ((row + 1)..n).map(|c| a[row][c] * x[c]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    x.iter().all(|v| v.is_finite()).then_some(x)
}

/// Forecast `steps` values of raw observations with an ARIMA(order, 1, 0).
pub fn forecast_values(
    values: &[f64],
    steps: usize,
    order: usize,
) -> Result<Vec<f64>, ForecastError> {
    if values.len() < MIN_POINTS {
        return Err(ForecastError::InsufficientData {
            have: values.len(),
            need: MIN_POINTS,
        });
    }
    if let Some(index) = values.iter().position(|v| !v.is_finite()) {
        return Err(ForecastError::NonFinite { index });
    }

    let mut diffs: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();
    let model = ArModel::fit(&diffs, order);
    tracing::debug!(
        order = model.order(),
        intercept = model.intercept,
        "fitted AR model"
    );

    let mut level = values[values.len() - 1];
    let mut out = Vec::with_capacity(steps);
    for _ in 0..steps {
        let next = model.predict_next(&diffs);
        diffs.push(next);
        level += next;
        out.push(level);
    }
    Ok(out)
}

/// Forecast the series' source column `steps` intervals past its last bar.
pub fn forecast(
    series: &PriceSeries,
    steps: usize,
    interval: Interval,
    source: PriceField,
) -> Result<Vec<ForecastPoint>, ForecastError> {
    let values = series.values(source);
    let predicted = forecast_values(&values, steps, DEFAULT_ORDER)?;
    let Some(last) = series.last_timestamp() else {
        return Err(ForecastError::InsufficientData {
            have: 0,
            need: MIN_POINTS,
        });
    };

    Ok(interval
        .successors(last, steps)
        .into_iter()
        .zip(predicted)
        .map(|(timestamp, value)| ForecastPoint { timestamp, value })
        .collect())
}
