//! Chat-completion port trait.

use crate::domain::error::DashboardError;

#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub system: String,
    pub user: String,
    pub temperature: f64,
    pub max_tokens: Option<u32>,
}

pub trait ChatPort {
    /// Text of the first completion choice.
    fn complete(&self, request: &ChatRequest) -> Result<String, DashboardError>;
}
