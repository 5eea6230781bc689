//! Collaborator traits: the search/crawl provider, the language model, and
//! the persisted list.
//!
//! The pipeline only ever talks to the outside world through these. HTTP
//! implementations live in `tastemaker-client`; the SQLite list store lives
//! in [`crate::store`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Error;
use crate::restaurant::Restaurant;

/// A web search request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub query: String,

    /// Restrict results to this domain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    pub max_results: u32,

    /// Ask for full page text alongside the snippet.
    #[serde(default)]
    pub include_raw_content: bool,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self { query: query.into(), domain: None, max_results: 5, include_raw_content: false }
    }

    pub fn domain(mut self, domain: Option<&str>) -> Self {
        self.domain = domain.map(str::to_string);
        self
    }

    pub fn max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn raw_content(mut self) -> Self {
        self.include_raw_content = true;
        self
    }
}

/// One search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub url: String,
    #[serde(default)]
    pub title: String,
    /// Snippet text.
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub raw_content: Option<String>,
}

impl SearchHit {
    /// Full text when available, otherwise the snippet.
    pub fn best_text(&self) -> &str {
        match self.raw_content.as_deref() {
            Some(raw) if !raw.trim().is_empty() => raw,
            _ => &self.content,
        }
    }
}

/// Extracted text of one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedPage {
    pub url: String,
    #[serde(default)]
    pub raw_content: String,
}

/// Parameters shared by `crawl` and `map`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Traversal {
    pub url: String,
    pub max_depth: u32,
    pub max_breadth: u32,
    pub limit: u32,
}

impl Traversal {
    pub fn new(url: impl Into<String>, max_depth: u32, max_breadth: u32, limit: u32) -> Self {
        Self { url: url.into(), max_depth, max_breadth, limit }
    }
}

/// Search, extract, crawl, and map over the web.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>, Error>;

    /// Extract page text. Pages the provider could not read are omitted.
    async fn extract(&self, urls: &[String]) -> Result<Vec<ExtractedPage>, Error>;

    /// Crawl from a URL and return the text of each page reached.
    async fn crawl(&self, request: &Traversal) -> Result<Vec<String>, Error>;

    /// Discover the links reachable from a URL.
    async fn map(&self, request: &Traversal) -> Result<Vec<String>, Error>;
}

/// One system message plus one user message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    /// Ask the model for a JSON object.
    #[serde(default)]
    pub json_mode: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    pub fn text(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self { system: system.into(), user: user.into(), json_mode: false, max_tokens: None }
    }

    pub fn json(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self { json_mode: true, ..Self::text(system, user) }
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// A chat model.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, Error>;
}

/// The durable curated list. Identity is the case-insensitive name.
#[async_trait]
pub trait ListStore: Send + Sync {
    async fn read_all(&self) -> Result<Vec<Restaurant>, Error>;

    /// Append records, skipping names already present. Returns rows written.
    async fn append_batch(&self, restaurants: &[Restaurant]) -> Result<usize, Error>;

    /// Remove a record by name. Returns whether anything was removed.
    async fn remove_by_name(&self, name: &str) -> Result<bool, Error>;
}
