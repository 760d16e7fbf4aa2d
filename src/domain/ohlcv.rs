//! OHLCV bar and per-instrument price series.

use chrono::NaiveDateTime;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    /// (high + low + close) / 3
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    pub fn field(&self, source: PriceField) -> f64 {
        match source {
            PriceField::Open => self.open,
            PriceField::High => self.high,
            PriceField::Low => self.low,
            PriceField::Close => self.close,
        }
    }
}

/// Column an indicator reads its input from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PriceField {
    Open,
    High,
    Low,
    #[default]
    Close,
}

impl std::str::FromStr for PriceField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(PriceField::Open),
            "high" => Ok(PriceField::High),
            "low" => Ok(PriceField::Low),
            "close" => Ok(PriceField::Close),
            other => Err(format!("unknown price field '{}'", other)),
        }
    }
}

impl std::fmt::Display for PriceField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            PriceField::Open => "open",
            PriceField::High => "high",
            PriceField::Low => "low",
            PriceField::Close => "close",
        })
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SeriesError {
    #[error("timestamps out of order at index {index}")]
    Unordered { index: usize },

    #[error("duplicate timestamp {timestamp}")]
    Duplicate { timestamp: NaiveDateTime },
}

/// Bars for one instrument with strictly increasing timestamps.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(bars: Vec<PriceBar>) -> Result<Self, SeriesError> {
        for (i, pair) in bars.windows(2).enumerate() {
            if pair[1].timestamp == pair[0].timestamp {
                return Err(SeriesError::Duplicate {
                    timestamp: pair[1].timestamp,
                });
            }
            if pair[1].timestamp < pair[0].timestamp {
                return Err(SeriesError::Unordered { index: i + 1 });
            }
        }
        Ok(Self { bars })
    }

    /// Sorts by timestamp; for a repeated timestamp the later bar wins.
    pub fn from_unsorted(mut bars: Vec<PriceBar>) -> Self {
        bars.reverse();
        bars.sort_by_key(|b| b.timestamp);
        bars.dedup_by_key(|b| b.timestamp);
        Self { bars }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_timestamp(&self) -> Option<NaiveDateTime> {
        self.bars.first().map(|b| b.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        self.bars.last().map(|b| b.timestamp)
    }

    pub fn closes(&self) -> Vec<f64> {
        self.values(PriceField::Close)
    }

    pub fn values(&self, source: PriceField) -> Vec<f64> {
        self.bars.iter().map(|b| b.field(source)).collect()
    }
}
