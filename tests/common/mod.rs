#![allow(dead_code)]

use chopscreen::domain::error::DashboardError;
use chopscreen::domain::interval::Interval;
pub use chopscreen::domain::ohlcv::{PriceBar, PriceSeries};
use chopscreen::ports::chat_port::{ChatPort, ChatRequest};
use chopscreen::ports::data_port::DataPort;
use chopscreen::ports::news_port::{NewsError, NewsPort};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::cell::RefCell;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_closes(self, ticker: &str, closes: &[f64]) -> Self {
        self.with_bars(ticker, bars_from_closes(closes))
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_ohlcv(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        _interval: Interval,
    ) -> Result<PriceSeries, DashboardError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(DashboardError::DataFetch {
                ticker: ticker.to_string(),
                reason: reason.clone(),
            });
        }
        let bars = self
            .data
            .get(ticker)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|b| b.timestamp.date() >= start_date && b.timestamp.date() < end_date)
            .collect();
        Ok(PriceSeries::from_unsorted(bars))
    }
}

pub fn start_timestamp() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// Daily bars from 2025-01-01 with a one-percent high/low spread.
pub fn bars_from_closes(closes: &[f64]) -> Vec<PriceBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            timestamp: start_timestamp() + Duration::days(i as i64),
            open: close,
            high: close * 1.01,
            low: close * 0.99,
            close,
            volume: 1_000_000.0,
        })
        .collect()
}

/// Drifting sine wave; distinct phases give weakly correlated returns.
pub fn wave(n: usize, phase: f64, drift: f64) -> Vec<f64> {
    (0..n)
        .map(|i| 100.0 + drift * i as f64 + 5.0 * ((i as f64) * 0.3 + phase).sin())
        .collect()
}

pub fn linear(n: usize, start: f64, step: f64) -> Vec<f64> {
    (0..n).map(|i| start + step * i as f64).collect()
}

pub struct MockNewsPort {
    pub result: Result<Vec<String>, NewsError>,
}

impl MockNewsPort {
    pub fn headlines(headlines: &[&str]) -> Self {
        Self {
            result: Ok(headlines.iter().map(|h| h.to_string()).collect()),
        }
    }

    pub fn failing(err: NewsError) -> Self {
        Self { result: Err(err) }
    }
}

impl NewsPort for MockNewsPort {
    fn headlines(&self, _company: &str, max: usize) -> Result<Vec<String>, NewsError> {
        self.result
            .clone()
            .map(|h| h.into_iter().take(max).collect())
    }
}

/// Chat port returning a canned reply and recording every request.
pub struct MockChatPort {
    pub reply: Result<String, String>,
    pub requests: RefCell<Vec<ChatRequest>>,
}

impl MockChatPort {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            reply: Err(reason.to_string()),
            requests: RefCell::new(Vec::new()),
        }
    }
}

impl ChatPort for MockChatPort {
    fn complete(&self, request: &ChatRequest) -> Result<String, DashboardError> {
        self.requests.borrow_mut().push(request.clone());
        self.reply
            .clone()
            .map_err(|reason| DashboardError::Chat { reason })
    }
}
