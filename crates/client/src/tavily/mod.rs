//! Tavily API client.
//!
//! Provides search, extract, crawl and map over the Tavily REST API and
//! implements [`SearchProvider`] for the discovery pipeline.
//!
//! ### API
//!
//! - **Endpoint**: `https://api.tavily.com` (`/search`, `/extract`, `/crawl`, `/map`)
//! - **Authentication**: `Authorization: Bearer <key>` header.
//! - **Errors**: 401/403 map to auth errors, 429 and 432 to rate limiting.
//! - **Normalization**: Responses become the provider types in `tastemaker_core::provider`.

pub mod error;
pub mod request;
pub mod response;

pub use error::TavilyError;
pub use request::{ExtractRequest, SearchRequest, TraversalRequest};

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tastemaker_core::provider::{ExtractedPage, SearchHit, SearchProvider, SearchQuery, Traversal};
use tastemaker_core::{AppConfig, Error};

/// Default base URL for the Tavily API.
const DEFAULT_BASE_URL: &str = "https://api.tavily.com";

/// Default request timeout. Crawls can be slow.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default user agent.
const DEFAULT_USER_AGENT: &str = "tastemaker/0.1";

/// Tavily client configuration.
#[derive(Debug, Clone)]
pub struct TavilyConfig {
    pub api_key: String,
    /// Base URL (default: https://api.tavily.com).
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for TavilyConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl TavilyConfig {
    /// Build from application config. Fails when no API key is set.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, TavilyError> {
        let api_key = config.require_tavily_api_key().map_err(|_| TavilyError::MissingApiKey)?;
        Ok(Self {
            api_key: api_key.to_string(),
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
            ..Default::default()
        })
    }
}

/// Tavily API client.
#[derive(Debug, Clone)]
pub struct TavilyClient {
    http: reqwest::Client,
    config: TavilyConfig,
}

impl TavilyClient {
    pub fn new(config: TavilyConfig) -> Result<Self, TavilyError> {
        if config.api_key.is_empty() {
            return Err(TavilyError::MissingApiKey);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TavilyError::Network(Arc::new(e)))?;

        Ok(Self { http, config })
    }

    pub fn from_app_config(config: &AppConfig) -> Result<Self, TavilyError> {
        Self::new(TavilyConfig::from_app_config(config)?)
    }

    async fn post<B: Serialize, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R, TavilyError> {
        let start = Instant::now();
        let url = format!("{}/{path}", self.config.base_url.trim_end_matches('/'));

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .header(header::ACCEPT, "application/json")
            .header(header::USER_AGENT, &self.config.user_agent)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!(path, status = status.as_u16(), elapsed_ms = start.elapsed().as_millis() as u64, "tavily response");

        match status.as_u16() {
            401 | 403 => return Err(TavilyError::AuthError),
            429 | 432 => return Err(TavilyError::RateLimited),
            _ if status.is_client_error() || status.is_server_error() => {
                return Err(TavilyError::HttpError { status: status.as_u16() });
            }
            _ => {}
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| TavilyError::Parse(e.to_string()))
    }

    pub async fn search(&self, req: &SearchRequest) -> Result<Vec<SearchHit>, TavilyError> {
        req.validate()?;
        tracing::debug!(query = %req.query, domains = ?req.include_domains, "searching");

        let response: response::SearchResponse = self.post("search", req).await?;
        Ok(response.results.into_iter().map(SearchHit::from).collect())
    }

    /// Pages Tavily could not read are logged and left out.
    pub async fn extract(&self, req: &ExtractRequest) -> Result<Vec<ExtractedPage>, TavilyError> {
        req.validate()?;
        tracing::debug!(count = req.urls.len(), "extracting");

        let response: response::ExtractResponse = self.post("extract", req).await?;
        for failed in &response.failed_results {
            tracing::debug!(url = %failed.url, error = %failed.error, "page not extracted");
        }
        Ok(response.results.into_iter().map(ExtractedPage::from).collect())
    }

    pub async fn crawl(&self, req: &TraversalRequest) -> Result<Vec<String>, TavilyError> {
        req.validate()?;
        tracing::debug!(url = %req.url, depth = req.max_depth, limit = req.limit, "crawling");

        let response: response::CrawlResponse = self.post("crawl", req).await?;
        Ok(response.results.into_iter().map(response::PageResult::into_text).collect())
    }

    pub async fn map(&self, req: &TraversalRequest) -> Result<Vec<String>, TavilyError> {
        req.validate()?;
        tracing::debug!(url = %req.url, depth = req.max_depth, limit = req.limit, "mapping");

        let response: response::MapResponse = self.post("map", req).await?;
        Ok(response.results)
    }
}

#[async_trait]
impl SearchProvider for TavilyClient {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>, Error> {
        Ok(TavilyClient::search(self, &SearchRequest::from(query)).await?)
    }

    async fn extract(&self, urls: &[String]) -> Result<Vec<ExtractedPage>, Error> {
        Ok(TavilyClient::extract(self, &ExtractRequest { urls: urls.to_vec() }).await?)
    }

    async fn crawl(&self, request: &Traversal) -> Result<Vec<String>, Error> {
        Ok(TavilyClient::crawl(self, &TraversalRequest::from(request)).await?)
    }

    async fn map(&self, request: &Traversal) -> Result<Vec<String>, Error> {
        Ok(TavilyClient::map(self, &TraversalRequest::from(request)).await?)
    }
}
