//! Chat-completions client error types.

use std::sync::Arc;

use tastemaker_core::Error;

/// Errors from the OpenAI-compatible chat client.
#[derive(Debug, thiserror::Error)]
pub enum OpenAiError {
    /// No API key configured.
    #[error("missing API key: TASTEMAKER_OPENAI_API_KEY not set")]
    MissingApiKey,

    /// Authentication failed (invalid API key).
    #[error("authentication failed: invalid API key")]
    AuthError,

    /// Rate limited by the API.
    #[error("rate limited: too many requests")]
    RateLimited,

    /// HTTP error response.
    #[error("HTTP error: {status}: {message}")]
    HttpError { status: u16, message: String },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Response parse error.
    #[error("parse error: {0}")]
    Parse(String),

    /// The model returned no message content.
    #[error("empty response")]
    EmptyResponse,
}

impl From<reqwest::Error> for OpenAiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { OpenAiError::Timeout } else { OpenAiError::Network(Arc::new(err)) }
    }
}

impl From<OpenAiError> for Error {
    fn from(err: OpenAiError) -> Self {
        Error::LlmFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OpenAiError::HttpError { status: 400, message: "bad model".into() };
        assert_eq!(err.to_string(), "HTTP error: 400: bad model");
        assert!(Error::from(OpenAiError::RateLimited).to_string().starts_with("LLM_FAILED: "));
    }
}
