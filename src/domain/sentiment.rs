//! News sentiment workflow: headlines in, analyst summary out.
//!
//! Collaborator failures never escape as errors. A news lookup failure
//! becomes a warning and a chat failure becomes a failure message; both are
//! values the caller can display and move on from.

use crate::domain::error::DashboardError;
use crate::ports::chat_port::{ChatPort, ChatRequest};
use crate::ports::news_port::{NewsPort, MAX_HEADLINES};
use std::fmt;

pub const SYSTEM_PROMPT: &str = "You are a helpful financial market assistant.";
pub const TEMPERATURE: f64 = 0.4;
pub const MAX_TOKENS: u32 = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentimentOutcome {
    Analysis(String),
    Warning(String),
    Failed(String),
}

impl SentimentOutcome {
    pub fn is_analysis(&self) -> bool {
        matches!(self, SentimentOutcome::Analysis(_))
    }
}

impl fmt::Display for SentimentOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SentimentOutcome::Analysis(text) => write!(f, "Sentiment Result:\n\n{}", text),
            SentimentOutcome::Warning(message) => write!(f, "! {}", message),
            SentimentOutcome::Failed(message) => write!(f, "error from chat API: {}", message),
        }
    }
}

pub fn build_prompt(company: &str, headlines: &[String]) -> String {
    let news_text = headlines
        .iter()
        .map(|h| format!("- {}", h))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are a financial analyst. Based on the following recent news headlines about {company}, do the following:

1. Summarize the current themes or events related to the company.
2. Determine the overall sentiment as one of the following:
   - Bullish: mostly positive outlook or upward movement.
   - Bearish: mostly negative outlook or downward movement.
   - Volatile: significant mix of up/down with uncertainty or instability.
   - Neutral: no strong tendency detected.
3. Keep it concise and insightful.

News headlines:
{news_text}

Respond with a clear and structured analysis.
"
    )
}

pub fn analyze_sentiment(
    news: &dyn NewsPort,
    chat: &dyn ChatPort,
    company: &str,
) -> SentimentOutcome {
    let headlines = match news.headlines(company, MAX_HEADLINES) {
        Ok(h) if h.is_empty() => {
            return SentimentOutcome::Warning("No headlines found.".to_string());
        }
        Ok(h) => h,
        Err(e) => {
            tracing::warn!(company, error = %e, "news lookup failed");
            return SentimentOutcome::Warning(e.to_string());
        }
    };
    tracing::info!(company, headlines = headlines.len(), "requesting sentiment");

    let request = ChatRequest {
        system: SYSTEM_PROMPT.to_string(),
        user: build_prompt(company, &headlines),
        temperature: TEMPERATURE,
        max_tokens: Some(MAX_TOKENS),
    };
    match chat.complete(&request) {
        Ok(text) => SentimentOutcome::Analysis(text.trim().to_string()),
        Err(e) => {
            tracing::warn!(company, error = %e, "chat completion failed");
            let message = match e {
                DashboardError::Chat { reason } => reason,
                other => other.to_string(),
            };
            SentimentOutcome::Failed(message)
        }
    }
}
