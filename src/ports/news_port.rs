//! News headline port trait.

pub const MAX_HEADLINES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NewsError {
    #[error("No ticker symbol found for company: {company}")]
    NoTicker { company: String },

    #[error("No news found for '{ticker}'")]
    NoNews { ticker: String },

    #[error("Error fetching news: {reason}")]
    Fetch { reason: String },
}

pub trait NewsPort {
    /// Up to `max` recent headlines about `company`, newest first.
    fn headlines(&self, company: &str, max: usize) -> Result<Vec<String>, NewsError>;
}
