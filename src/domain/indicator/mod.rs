//! Technical indicator implementations.
//!
//! This module provides types for representing indicator values and series:
//! - `IndicatorPoint`: A single point in an indicator time series
//! - `IndicatorValue`: Enum for different indicator output shapes
//! - `IndicatorType`: Enum for indicator identity + parameters
//! - `IndicatorSeries`: A time series of indicator values, aligned 1:1 with bars

pub mod bollinger;
pub mod chop_zone;
pub mod ema;
pub mod ichimoku;
pub mod rolling;
pub mod sma;

pub use bollinger::calculate_bollinger;
pub use chop_zone::{calculate_chop_zone, ChopZoneParams};
pub use ema::{calculate_ema, ema_recurrence};
pub use ichimoku::{calculate_ichimoku, IchimokuParams};
pub use sma::calculate_sma;

use chrono::NaiveDateTime;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub timestamp: NaiveDateTime,
    pub valid: bool,
    pub value: IndicatorValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorValue {
    Simple(f64),
    /// Chop zone class in 0..=8.
    Zone(u8),
    Bollinger {
        upper: f64,
        middle: f64,
        lower: f64,
    },
    Ichimoku {
        tenkan: Option<f64>,
        kijun: Option<f64>,
        span_a: Option<f64>,
        span_b: Option<f64>,
        chikou: Option<f64>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    ChopZone { length: usize, ema_length: usize },
    Bollinger { period: usize, stddev_mult_x100: u32 },
    Ichimoku { tenkan: usize, kijun: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn valid_count(&self) -> usize {
        self.values.iter().filter(|p| p.valid).count()
    }

    /// Scalar values with `None` for warm-up or degenerate points.
    pub fn simple_values(&self) -> Vec<Option<f64>> {
        self.values
            .iter()
            .map(|p| match (p.valid, &p.value) {
                (true, IndicatorValue::Simple(v)) => Some(*v),
                _ => None,
            })
            .collect()
    }

    /// Chop zone classes with `None` where undefined.
    pub fn zones(&self) -> Vec<Option<u8>> {
        self.values
            .iter()
            .map(|p| match (p.valid, &p.value) {
                (true, IndicatorValue::Zone(z)) => Some(*z),
                _ => None,
            })
            .collect()
    }

    pub fn last_valid(&self) -> Option<&IndicatorPoint> {
        self.values.iter().rev().find(|p| p.valid)
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::ChopZone { length, ema_length } => {
                write!(f, "CZ({},{})", length, ema_length)
            }
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => {
                let mult = *stddev_mult_x100 as f64 / 100.0;
                write!(f, "BOLLINGER({},{})", period, mult)
            }
            IndicatorType::Ichimoku { tenkan, kijun } => {
                write!(f, "ICHIMOKU({},{})", tenkan, kijun)
            }
        }
    }
}
