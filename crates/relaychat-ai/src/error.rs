//! Error types for the AI module

use thiserror::Error;

/// AI module error types
#[derive(Error, Debug)]
pub enum AiError {
    /// Credentials or endpoint missing from the provider configuration.
    #[error("{0}")]
    Configuration(String),

    /// Provider answered with a non-success status.
    #[error("{provider} API error: {status} - {body}")]
    Upstream {
        provider: String,
        status: u16,
        body: String,
    },

    /// Connection failed or dropped while talking to the provider.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AiError {
    /// HTTP status reported by the provider, if any.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            AiError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for AI operations
pub type Result<T> = std::result::Result<T, AiError>;
