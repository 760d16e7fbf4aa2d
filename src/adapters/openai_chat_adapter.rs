//! OpenAI-compatible chat-completions adapter (DeepSeek by default).

use crate::domain::config_validation::LlmSettings;
use crate::domain::error::DashboardError;
use crate::ports::chat_port::{ChatPort, ChatRequest};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

pub struct OpenAiChatAdapter {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl OpenAiChatAdapter {
    pub fn new(
        settings: &LlmSettings,
        api_key: String,
        timeout_secs: u64,
    ) -> Result<Self, DashboardError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| DashboardError::Http {
                reason: e.to_string(),
            })?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key,
        })
    }
}

fn chat_err(reason: impl Into<String>) -> DashboardError {
    DashboardError::Chat {
        reason: reason.into(),
    }
}

impl ChatPort for OpenAiChatAdapter {
    fn complete(&self, request: &ChatRequest) -> Result<String, DashboardError> {
        let body = CompletionRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: &request.system,
                },
                Message {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };
        tracing::debug!(model = %self.model, "sending chat completion");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| chat_err(e.to_string()))?;

        let status = response.status();
        let text = response.text().map_err(|e| chat_err(e.to_string()))?;
        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorResponse>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(chat_err(format!("HTTP {}: {}", status.as_u16(), detail)));
        }

        let parsed: CompletionResponse = serde_json::from_str(&text)
            .map_err(|e| chat_err(format!("invalid completion JSON: {}", e)))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| chat_err("completion had no choices"))
    }
}
