//! Company news through the Yahoo Finance search API.
//!
//! Two lookups: the company name resolves to the first quote symbol, then the
//! symbol's news titles are requested.

use crate::adapters::yahoo_adapter::{build_client, DEFAULT_BASE_URL};
use crate::domain::error::DashboardError;
use crate::ports::news_port::{NewsError, NewsPort};
use reqwest::blocking::Client;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    quotes: Vec<SearchQuote>,
    #[serde(default)]
    news: Vec<SearchNews>,
}

#[derive(Debug, Deserialize)]
struct SearchQuote {
    symbol: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchNews {
    title: Option<String>,
}

pub struct YahooNewsAdapter {
    client: Client,
    base_url: String,
}

impl YahooNewsAdapter {
    pub fn new(base_url: Option<&str>, timeout_secs: u64) -> Result<Self, DashboardError> {
        Ok(Self {
            client: build_client(timeout_secs)?,
            base_url: base_url
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
        })
    }

    fn search(&self, query: &str, quotes: usize, news: usize) -> Result<SearchResponse, NewsError> {
        let fetch = |e: reqwest::Error| NewsError::Fetch {
            reason: e.to_string(),
        };
        self.client
            .get(format!("{}/v1/finance/search", self.base_url))
            .query(&[
                ("q", query.to_string()),
                ("quotesCount", quotes.to_string()),
                ("newsCount", news.to_string()),
            ])
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(fetch)?
            .json()
            .map_err(fetch)
    }

    fn lookup_ticker(&self, company: &str) -> Result<String, NewsError> {
        self.search(company, 1, 0)?
            .quotes
            .into_iter()
            .find_map(|q| q.symbol.filter(|s| !s.trim().is_empty()))
            .ok_or_else(|| NewsError::NoTicker {
                company: company.to_string(),
            })
    }
}

impl NewsPort for YahooNewsAdapter {
    fn headlines(&self, company: &str, max: usize) -> Result<Vec<String>, NewsError> {
        let ticker = self.lookup_ticker(company)?;
        tracing::debug!(company, %ticker, "resolved ticker");

        let headlines: Vec<String> = self
            .search(&ticker, 0, max)?
            .news
            .into_iter()
            .filter_map(|n| n.title)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .take(max)
            .collect();

        if headlines.is_empty() {
            return Err(NewsError::NoNews { ticker });
        }
        Ok(headlines)
    }
}
