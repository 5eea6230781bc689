//! tastemaker-mcp server entry point.
//!
//! Boots the restaurant curation agent as an MCP server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tastemaker_client::{OpenAiClient, TavilyClient, TavilyError};
use tastemaker_core::{AppConfig, ResponseCache, RestaurantAgent, SearchProvider, SqliteListStore};
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("loading configuration")?;

    let search: Option<Arc<dyn SearchProvider>> = match TavilyClient::from_app_config(&config) {
        Ok(client) => Some(Arc::new(client)),
        Err(TavilyError::MissingApiKey) => {
            tracing::warn!("TASTEMAKER_TAVILY_API_KEY not set; discovery is disabled");
            None
        }
        Err(e) => return Err(e).context("building search client"),
    };
    let llm = OpenAiClient::from_app_config(&config).context("building chat-completions client")?;
    let store = SqliteListStore::open(&config.db_path)
        .await
        .with_context(|| format!("opening list database at {}", config.db_path.display()))?;
    let cache = ResponseCache::from_config(&config);

    tracing::info!(
        location = %config.location,
        model = llm.model(),
        sources = config.sources.len(),
        cache_enabled = cache.is_enabled(),
        "Starting tastemaker-mcp server on stdio transport"
    );

    let agent = RestaurantAgent::new(&config, search, Arc::new(llm), Arc::new(store), cache.clone());
    let handler = handler::McpRestaurantServer::new(agent, cache);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
