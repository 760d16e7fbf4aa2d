//! Ticker universe for a screening run.
//!
//! Parses comma-separated ticker lists from the command line or config.

use std::collections::HashSet;

pub const MAX_TICKERS: usize = 30;

pub const DEFAULT_TICKERS: &str = "AAPL, MSFT, TSLA, NVDA, AMZN, GOOGL, JPM, UNH, JNJ, V, \
     MA, PG, XOM, PFE, COST, ORCL, NFLX, META, DIS, KO";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in ticker list")]
    EmptyToken,

    #[error("duplicate ticker: {0}")]
    DuplicateTicker(String),

    #[error("too many tickers: {count} given, at most {max} allowed")]
    TooMany { count: usize, max: usize },

    #[error("ticker list is empty")]
    Empty,
}

pub fn parse_tickers(input: &str) -> Result<Vec<String>, UniverseError> {
    if input.trim().is_empty() {
        return Err(UniverseError::Empty);
    }

    let mut tickers = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let ticker = trimmed.to_uppercase();
        if !seen.insert(ticker.clone()) {
            return Err(UniverseError::DuplicateTicker(ticker));
        }
        tickers.push(ticker);
    }

    if tickers.len() > MAX_TICKERS {
        return Err(UniverseError::TooMany {
            count: tickers.len(),
            max: MAX_TICKERS,
        });
    }
    Ok(tickers)
}
