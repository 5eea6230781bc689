//! Tavily client error types.

use std::sync::Arc;

use tastemaker_core::Error;

/// Errors from the Tavily API client.
#[derive(Debug, thiserror::Error)]
pub enum TavilyError {
    /// No API key configured.
    #[error("missing API key: TASTEMAKER_TAVILY_API_KEY not set")]
    MissingApiKey,

    /// Request rejected before sending.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Authentication failed (invalid API key).
    #[error("authentication failed: invalid API key")]
    AuthError,

    /// Rate limited or out of credits.
    #[error("rate limited: too many requests")]
    RateLimited,

    /// HTTP error response.
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Response parse error.
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for TavilyError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { TavilyError::Timeout } else { TavilyError::Network(Arc::new(err)) }
    }
}

impl From<TavilyError> for Error {
    fn from(err: TavilyError) -> Self {
        match err {
            TavilyError::MissingApiKey | TavilyError::AuthError => Error::SearchAuth(err.to_string()),
            TavilyError::InvalidRequest(reason) => Error::InvalidInput(reason),
            other => Error::SearchFailed(other.to_string()),
        }
    }
}
