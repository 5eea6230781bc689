//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::tools::{
    RestaurantApproveParams, RestaurantChatParams, RestaurantDetailsParams, SessionSlot, approve_impl,
    cache::{CacheClearParams, CacheStatsParams, clear_impl, stats_impl},
    chat_impl, details_impl,
};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};
use tastemaker_core::{ResponseCache, RestaurantAgent};

const INSTRUCTIONS: &str = "Curates a personal restaurant list. Call restaurant_chat with a request \
(find new restaurants, remove one, or show the list). When the reply is awaiting approval, answer \
with restaurant_approve; restaurant_details expands one recommended entry.";

/// The main MCP server handler for tastemaker-mcp.
#[derive(Clone)]
pub struct McpRestaurantServer {
    agent: Arc<RestaurantAgent>,
    cache: ResponseCache,
    session: Arc<SessionSlot>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl McpRestaurantServer {
    pub fn new(agent: RestaurantAgent, cache: ResponseCache) -> Self {
        Self {
            agent: Arc::new(agent),
            cache,
            session: Arc::new(SessionSlot::default()),
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Start a turn from a free-text request: discover new restaurants, remove one from the list, or show the list. Discovery and removals wait for restaurant_approve before anything is saved."
    )]
    async fn restaurant_chat(&self, params: Parameters<RestaurantChatParams>) -> Result<CallToolResult, McpError> {
        chat_impl(&self.agent, &self.session, params.0).await
    }

    #[tool(
        description = "Approve or reject the pending recommendation. Pass selection with 1-based positions to keep only some of it."
    )]
    async fn restaurant_approve(
        &self, params: Parameters<RestaurantApproveParams>,
    ) -> Result<CallToolResult, McpError> {
        approve_impl(&self.agent, &self.session, params.0).await
    }

    #[tool(description = "Show the full record of the N-th restaurant (1-based) in the latest recommendation.")]
    async fn restaurant_details(
        &self, params: Parameters<RestaurantDetailsParams>,
    ) -> Result<CallToolResult, McpError> {
        details_impl(&self.session, params.0).await
    }

    #[tool(description = "Report response cache file counts and sizes per kind (search, extract, crawl, map, price).")]
    async fn cache_stats(&self, params: Parameters<CacheStatsParams>) -> Result<CallToolResult, McpError> {
        stats_impl(&self.cache, params.0).await
    }

    #[tool(description = "Delete every cached provider response. Requires confirm=true. The restaurant list is not affected.")]
    async fn cache_clear(&self, params: Parameters<CacheClearParams>) -> Result<CallToolResult, McpError> {
        clear_impl(&self.cache, params.0).await
    }
}

impl ServerHandler for McpRestaurantServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "tastemaker-mcp".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(INSTRUCTIONS.into()),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::agent;

    #[tokio::test]
    async fn test_all_tools_registered() {
        let (agent, _) = agent("{}").await;
        let server = McpRestaurantServer::new(agent, ResponseCache::disabled());

        let mut names: Vec<String> = server.tool_router.list_all().into_iter().map(|t| t.name.to_string()).collect();
        names.sort();
        assert_eq!(
            names,
            vec!["cache_clear", "cache_stats", "restaurant_approve", "restaurant_chat", "restaurant_details"]
        );
    }

    #[tokio::test]
    async fn test_server_info() {
        let (agent, _) = agent("{}").await;
        let info = McpRestaurantServer::new(agent, ResponseCache::disabled()).get_info();
        assert_eq!(info.server_info.name, "tastemaker-mcp");
        assert!(info.capabilities.tools.is_some());
    }
}
