//! cache_stats tool implementation.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tastemaker_core::ResponseCache;

use crate::tools::json_result;

/// Parameters for the cache_stats tool. Takes none.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CacheStatsParams {}

/// Implementation of the cache_stats tool.
pub async fn stats_impl(cache: &ResponseCache, _params: CacheStatsParams) -> Result<CallToolResult, McpError> {
    json_result(&cache.stats().await)
}
