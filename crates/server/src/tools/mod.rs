//! MCP tool implementations.
//!
//! This module contains all tools exposed by the tastemaker-mcp server.

pub mod cache;
pub mod restaurant_approve;
pub mod restaurant_chat;
pub mod restaurant_details;

pub use restaurant_approve::{RestaurantApproveParams, approve_impl};
pub use restaurant_chat::{RestaurantChatOutput, RestaurantChatParams, chat_impl};
pub use restaurant_details::{RestaurantDetailsParams, details_impl};

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;
use tastemaker_core::{Error, Session};
use tokio::sync::Mutex;

/// The most recent turn, kept between tool calls so it can be approved or inspected.
pub type SessionSlot = Mutex<Option<Session>>;

/// Render `output` as pretty JSON text content.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::Internal(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use async_trait::async_trait;
    use rmcp::model::CallToolResult;
    use tastemaker_core::provider::CompletionRequest;
    use tastemaker_core::{AppConfig, Error, LanguageModel, ListStore, ResponseCache, RestaurantAgent, SqliteListStore};

    /// Always answers with the same completion.
    pub struct FixedModel(pub String);

    #[async_trait]
    impl LanguageModel for FixedModel {
        async fn complete(&self, _request: &CompletionRequest) -> Result<String, Error> {
            Ok(self.0.clone())
        }
    }

    /// Agent with no search provider over an in-memory list.
    pub async fn agent(reply: &str) -> (RestaurantAgent, Arc<SqliteListStore>) {
        let store = Arc::new(SqliteListStore::open_in_memory().await.unwrap());
        let list: Arc<dyn ListStore> = store.clone();
        let agent = RestaurantAgent::new(
            &AppConfig::default(),
            None,
            Arc::new(FixedModel(reply.to_string())),
            list,
            ResponseCache::disabled(),
        );
        (agent, store)
    }

    pub fn text_of(result: &CallToolResult) -> String {
        let content = serde_json::to_value(&result.content[0]).unwrap();
        content
            .get("text")
            .and_then(|v| v.as_str())
            .expect("Expected text field in content")
            .to_string()
    }
}
