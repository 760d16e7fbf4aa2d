//! Yahoo Finance chart API data adapter.
//!
//! `GET {base}/v8/finance/chart/{ticker}?period1=..&period2=..&interval=..`
//! returns parallel arrays of timestamps and OHLCV values. Entries with any
//! null price are dropped; a null volume reads as zero. Daily and coarser
//! bars are normalised to midnight of the exchange-local date.

use crate::domain::error::DashboardError;
use crate::domain::interval::Interval;
use crate::domain::ohlcv::{PriceBar, PriceSeries};
use crate::ports::data_port::DataPort;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const USER_AGENT: &str = "Mozilla/5.0";

/// Blocking client shared by the Yahoo adapters.
pub fn build_client(timeout_secs: u64) -> Result<Client, DashboardError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| DashboardError::Http {
            reason: e.to_string(),
        })
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

pub struct YahooAdapter {
    client: Client,
    base_url: String,
}

impl YahooAdapter {
    pub fn new(base_url: Option<&str>, timeout_secs: u64) -> Result<Self, DashboardError> {
        Ok(Self {
            client: build_client(timeout_secs)?,
            base_url: base_url
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
        })
    }
}

fn unix_seconds(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

fn bar_timestamp(secs: i64, gmtoffset: i64, interval: Interval) -> Option<NaiveDateTime> {
    let utc = DateTime::from_timestamp(secs, 0)?.naive_utc();
    match interval {
        Interval::Hour => Some(utc),
        _ => (utc + chrono::Duration::seconds(gmtoffset))
            .date()
            .and_hms_opt(0, 0, 0),
    }
}

fn parse_chart(
    ticker: &str,
    body: &str,
    interval: Interval,
) -> Result<PriceSeries, DashboardError> {
    let fetch_err = |reason: String| DashboardError::DataFetch {
        ticker: ticker.to_string(),
        reason,
    };
    let response: ChartResponse =
        serde_json::from_str(body).map_err(|e| fetch_err(format!("invalid chart JSON: {}", e)))?;

    if let Some(err) = response.chart.error {
        return Err(fetch_err(format!(
            "{}: {}",
            err.code.unwrap_or_else(|| "error".into()),
            err.description.unwrap_or_default()
        )));
    }

    let Some(result) = response.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(PriceSeries::empty());
    };
    let timestamps = result.timestamp.unwrap_or_default();
    let gmtoffset = result.meta.and_then(|m| m.gmtoffset).unwrap_or(0);
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    let at = |column: &[Option<f64>], i: usize| column.get(i).copied().flatten();
    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, &secs) in timestamps.iter().enumerate() {
        let (Some(open), Some(high), Some(low), Some(close)) = (
            at(&quote.open, i),
            at(&quote.high, i),
            at(&quote.low, i),
            at(&quote.close, i),
        ) else {
            continue;
        };
        let Some(timestamp) = bar_timestamp(secs, gmtoffset, interval) else {
            continue;
        };
        bars.push(PriceBar {
            timestamp,
            open,
            high,
            low,
            close,
            volume: at(&quote.volume, i).unwrap_or(0.0),
        });
    }

    Ok(PriceSeries::from_unsorted(bars))
}

impl DataPort for YahooAdapter {
    fn fetch_ohlcv(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        interval: Interval,
    ) -> Result<PriceSeries, DashboardError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, ticker);
        tracing::debug!(%url, ticker, %interval, "fetching chart");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("period1", unix_seconds(start_date).to_string()),
                ("period2", unix_seconds(end_date).to_string()),
                ("interval", interval.to_string()),
                ("includePrePost", "false".to_string()),
            ])
            .send()
            .map_err(|e| DashboardError::DataFetch {
                ticker: ticker.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().map_err(|e| DashboardError::DataFetch {
            ticker: ticker.to_string(),
            reason: e.to_string(),
        })?;

        // Unknown symbols come back as 404 with a chart.error payload.
        let series = parse_chart(ticker, &body, interval)?;
        if !status.is_success() {
            return Err(DashboardError::DataFetch {
                ticker: ticker.to_string(),
                reason: format!("HTTP {}", status),
            });
        }
        Ok(series)
    }
}
