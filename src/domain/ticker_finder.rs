//! Free-text ticker lookup through a chat model.

use crate::domain::error::DashboardError;
use crate::ports::chat_port::{ChatPort, ChatRequest};

pub const SYSTEM_PROMPT: &str = "You are a helpful stock market assistant.";
pub const TEMPERATURE: f64 = 0.3;
pub const MAX_TOKENS: u32 = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerSuggestions {
    pub raw: String,
    pub tickers: Vec<String>,
}

impl TickerSuggestions {
    /// Comma-joined tickers, suitable for `screen --tickers`.
    pub fn ticker_list(&self) -> String {
        if self.tickers.is_empty() {
            "no tickers found".to_string()
        } else {
            self.tickers.join(", ")
        }
    }
}

pub fn build_prompt(query: &str) -> String {
    format!(
        "You are a financial assistant.
The user will describe the kind of tickers they want.
Return a clean list of ticker symbols and their company names.
Format strictly as:

TICKER - Company Name

Example:
AAPL - Apple Inc
TSLA - Tesla Inc
JNJ - Johnson & Johnson

Do NOT add commentary. Just return the list.
---
User request: {query}
"
    )
}

/// Leading run of uppercase letters and dots on each line.
pub fn parse_tickers(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| {
            let end = line
                .find(|c: char| !(c.is_ascii_uppercase() || c == '.'))
                .unwrap_or(line.len());
            &line[..end]
        })
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn find_tickers(
    chat: &dyn ChatPort,
    query: &str,
) -> Result<TickerSuggestions, DashboardError> {
    let request = ChatRequest {
        system: SYSTEM_PROMPT.to_string(),
        user: build_prompt(query),
        temperature: TEMPERATURE,
        max_tokens: Some(MAX_TOKENS),
    };
    let raw = chat.complete(&request)?.trim().to_string();
    let tickers = parse_tickers(&raw);
    tracing::debug!(count = tickers.len(), "parsed tickers");
    Ok(TickerSuggestions { raw, tickers })
}
