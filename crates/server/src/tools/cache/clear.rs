//! cache_clear tool implementation.
//!
//! Removes every cached provider response. The curated list is untouched.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tastemaker_core::{Error, ResponseCache};

use crate::tools::json_result;

/// Parameters for the cache_clear tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheClearParams {
    /// Must be true; guards against accidental purges.
    pub confirm: bool,
}

/// Implementation of the cache_clear tool.
pub async fn clear_impl(cache: &ResponseCache, params: CacheClearParams) -> Result<CallToolResult, McpError> {
    if !params.confirm {
        return Err(Error::InvalidInput("confirm must be true to clear the cache".to_string()).into());
    }

    json_result(&cache.clear().await)
}
