use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM configuration error: {0}")]
    Configuration(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} returned status {status}: {message}")]
    Api {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("malformed provider response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("provider returned no content")]
    EmptyResponse,

    #[error("all providers exhausted, last error: {source}")]
    Exhausted {
        #[source]
        source: Box<LlmError>,
    },
}

impl LlmError {
    /// Transient failures are retried with backoff; everything else
    /// aborts the current provider's attempts immediately.
    pub fn is_transient(&self) -> bool {
        match self {
            LlmError::Http(_) | LlmError::Timeout(_) => true,
            LlmError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, LlmError>;
