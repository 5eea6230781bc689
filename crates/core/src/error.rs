//! Unified error types for tastemaker.
//!
//! Every variant renders as `CODE: detail` so the human-facing layer can
//! surface errors verbatim.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

use crate::config::ConfigError;

/// Unified error types for the discovery pipeline and its collaborators.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty user message).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Configuration is missing or invalid.
    #[error("CONFIG_ERROR: {0}")]
    Config(#[from] ConfigError),

    /// Search/crawl provider call failed.
    #[error("SEARCH_FAILED: {0}")]
    SearchFailed(String),

    /// Search provider rejected our credentials.
    #[error("SEARCH_AUTH_ERROR: {0}")]
    SearchAuth(String),

    /// LLM completion failed.
    #[error("LLM_FAILED: {0}")]
    LlmFailed(String),

    /// Model output could not be parsed into the expected shape.
    #[error("EXTRACT_PARSE_FAILED: {0}")]
    ExtractParse(String),

    /// Filesystem cache read/write failed.
    #[error("CACHE_ERROR: {0}")]
    Cache(String),

    /// Database operation failed.
    #[error("STORE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("STORE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// An approval arrived with no recommendation awaiting one.
    #[error("NO_PENDING_APPROVAL")]
    NoPendingApproval,

    /// A spawned unit of work panicked or was cancelled.
    #[error("INTERNAL: {0}")]
    Internal(String),
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Cache(err.to_string())
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::InvalidInput(_) => -32602,
            Error::Config(_) => -32001,
            Error::SearchFailed(_) => -32002,
            Error::SearchAuth(_) => -32003,
            Error::LlmFailed(_) => -32004,
            Error::ExtractParse(_) => -32005,
            Error::Cache(_) => -32006,
            Error::Database(_) | Error::MigrationFailed(_) => -32007,
            Error::NoPendingApproval => -32008,
            Error::Internal(_) => -32603,
        };

        McpError { code: ErrorCode(code), message: err.to_string().into(), data: None }
    }
}
