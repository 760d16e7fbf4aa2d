//! Top-level error type and exit-code mapping.

use crate::domain::selector::SelectionError;

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data fetch failed for {ticker}: {reason}")]
    DataFetch { ticker: String, reason: String },

    #[error("no data for {ticker}")]
    NoData { ticker: String },

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error("http client error: {reason}")]
    Http { reason: String },

    #[error("chat API error: {reason}")]
    Chat { reason: String },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DashboardError {
    pub fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&DashboardError> for std::process::ExitCode {
    fn from(err: &DashboardError) -> Self {
        let code: u8 = match err {
            DashboardError::Io(_) | DashboardError::Report { .. } => 1,
            DashboardError::ConfigParse { .. }
            | DashboardError::ConfigMissing { .. }
            | DashboardError::ConfigInvalid { .. } => 2,
            DashboardError::DataFetch { .. }
            | DashboardError::Http { .. }
            | DashboardError::Chat { .. } => 3,
            DashboardError::NoData { .. } | DashboardError::Selection(_) => 5,
        };
        std::process::ExitCode::from(code)
    }
}
