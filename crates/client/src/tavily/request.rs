//! Tavily API request bodies and validation.

use serde::Serialize;
use tastemaker_core::provider::{SearchQuery, Traversal};

use super::TavilyError;

/// Body of `POST /search`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchRequest {
    pub query: String,

    /// 1-20.
    pub max_results: u32,

    pub include_raw_content: bool,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub include_domains: Vec<String>,

    /// basic|advanced.
    pub search_depth: &'static str,
}

impl From<&SearchQuery> for SearchRequest {
    fn from(query: &SearchQuery) -> Self {
        Self {
            query: query.query.clone(),
            max_results: query.max_results,
            include_raw_content: query.include_raw_content,
            include_domains: query.domain.iter().cloned().collect(),
            search_depth: "advanced",
        }
    }
}

impl SearchRequest {
    pub fn validate(&self) -> Result<(), TavilyError> {
        if self.query.trim().is_empty() {
            return Err(TavilyError::InvalidRequest("query cannot be empty".to_string()));
        }
        if self.query.chars().count() > 400 {
            return Err(TavilyError::InvalidRequest(format!(
                "query too long: {} chars (max 400)",
                self.query.chars().count()
            )));
        }
        if !(1..=20).contains(&self.max_results) {
            return Err(TavilyError::InvalidRequest("max_results must be 1-20".to_string()));
        }
        Ok(())
    }
}

/// Body of `POST /extract`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExtractRequest {
    pub urls: Vec<String>,
}

impl ExtractRequest {
    /// Most URLs per extract call.
    pub const MAX_URLS: usize = 20;

    pub fn validate(&self) -> Result<(), TavilyError> {
        if self.urls.is_empty() {
            return Err(TavilyError::InvalidRequest("no URLs to extract".to_string()));
        }
        if self.urls.len() > Self::MAX_URLS {
            return Err(TavilyError::InvalidRequest(format!(
                "too many URLs: {} (max {})",
                self.urls.len(),
                Self::MAX_URLS
            )));
        }
        Ok(())
    }
}

/// Body of `POST /crawl` and `POST /map`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TraversalRequest {
    pub url: String,
    pub max_depth: u32,
    pub max_breadth: u32,
    pub limit: u32,
}

impl From<&Traversal> for TraversalRequest {
    fn from(t: &Traversal) -> Self {
        Self { url: t.url.clone(), max_depth: t.max_depth, max_breadth: t.max_breadth, limit: t.limit }
    }
}

impl TraversalRequest {
    pub fn validate(&self) -> Result<(), TavilyError> {
        tastemaker_core::url::canonicalize(&self.url).map_err(|e| TavilyError::InvalidRequest(e.to_string()))?;
        if self.max_depth == 0 || self.max_breadth == 0 || self.limit == 0 {
            return Err(TavilyError::InvalidRequest("depth, breadth and limit must be positive".to_string()));
        }
        Ok(())
    }
}
