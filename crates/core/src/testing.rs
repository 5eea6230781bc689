//! In-process collaborators for pipeline tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tempfile::TempDir;

use crate::Error;
use crate::cache::ResponseCache;
use crate::config::AppConfig;
use crate::discovery::Discovery;
use crate::provider::{CompletionRequest, ExtractedPage, LanguageModel, SearchHit, SearchProvider, SearchQuery, Traversal};
use crate::url::page_key;

#[derive(Debug, Default, Clone)]
struct Calls {
    search: Arc<AtomicUsize>,
    extract: Arc<AtomicUsize>,
    crawl: Arc<AtomicUsize>,
    map: Arc<AtomicUsize>,
    extract_batches: Arc<Mutex<Vec<Vec<String>>>>,
}

/// Canned search provider. Unknown queries, crawls and maps succeed empty.
#[derive(Debug, Default, Clone)]
pub struct MockSearchProvider {
    searches: HashMap<String, Vec<String>>,
    pages: Vec<(String, String)>,
    crawls: HashMap<String, Vec<String>>,
    maps: HashMap<String, Vec<String>>,
    failing_queries: HashSet<String>,
    failing_extracts: HashSet<String>,
    unavailable: bool,
    calls: Calls,
}

impl MockSearchProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Each text becomes the snippet of one hit for `query`.
    pub fn with_search(mut self, query: &str, texts: &[&str]) -> Self {
        self.searches.insert(query.to_string(), texts.iter().map(|t| t.to_string()).collect());
        self
    }

    pub fn with_page(mut self, url: &str, content: &str) -> Self {
        self.pages.push((url.to_string(), content.to_string()));
        self
    }

    pub fn with_crawl(mut self, url: &str, pages: &[&str]) -> Self {
        self.crawls.insert(page_key(url), pages.iter().map(|p| p.to_string()).collect());
        self
    }

    pub fn with_map(mut self, url: &str, links: &[&str]) -> Self {
        self.maps.insert(page_key(url), links.iter().map(|l| l.to_string()).collect());
        self
    }

    pub fn failing_query(mut self, query: &str) -> Self {
        self.failing_queries.insert(query.to_string());
        self
    }

    /// Any extract batch containing `url` fails.
    pub fn failing_extract(mut self, url: &str) -> Self {
        self.failing_extracts.insert(page_key(url));
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    pub fn search_calls(&self) -> usize {
        self.calls.search.load(Ordering::SeqCst)
    }

    pub fn extract_calls(&self) -> usize {
        self.calls.extract.load(Ordering::SeqCst)
    }

    pub fn crawl_calls(&self) -> usize {
        self.calls.crawl.load(Ordering::SeqCst)
    }

    pub fn map_calls(&self) -> usize {
        self.calls.map.load(Ordering::SeqCst)
    }

    pub fn extract_batches(&self) -> Vec<Vec<String>> {
        self.calls.extract_batches.lock().map(|b| b.clone()).unwrap_or_default()
    }

    fn check_available(&self) -> Result<(), Error> {
        if self.unavailable { Err(Error::SearchFailed("provider unavailable".into())) } else { Ok(()) }
    }
}

#[async_trait]
impl SearchProvider for MockSearchProvider {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>, Error> {
        self.calls.search.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        if self.failing_queries.contains(&query.query) {
            return Err(Error::SearchFailed(format!("query failed: {}", query.query)));
        }

        let texts = self.searches.get(&query.query).cloned().unwrap_or_default();
        Ok(texts
            .into_iter()
            .enumerate()
            .map(|(idx, content)| SearchHit {
                url: format!("https://results.test/{idx}"),
                title: query.query.clone(),
                content,
                raw_content: None,
            })
            .collect())
    }

    async fn extract(&self, urls: &[String]) -> Result<Vec<ExtractedPage>, Error> {
        self.calls.extract.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut batches) = self.calls.extract_batches.lock() {
            batches.push(urls.to_vec());
        }
        self.check_available()?;
        if urls.iter().any(|url| self.failing_extracts.contains(&page_key(url))) {
            return Err(Error::SearchFailed("extract failed".into()));
        }

        let wanted: HashSet<String> = urls.iter().map(|u| page_key(u)).collect();
        Ok(self
            .pages
            .iter()
            .filter(|(url, _)| wanted.contains(&page_key(url)))
            .map(|(url, content)| ExtractedPage { url: url.clone(), raw_content: content.clone() })
            .collect())
    }

    async fn crawl(&self, request: &Traversal) -> Result<Vec<String>, Error> {
        self.calls.crawl.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        Ok(self.crawls.get(&page_key(&request.url)).cloned().unwrap_or_default())
    }

    async fn map(&self, request: &Traversal) -> Result<Vec<String>, Error> {
        self.calls.map.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        Ok(self.maps.get(&page_key(&request.url)).cloned().unwrap_or_default())
    }
}

type Responder = dyn Fn(&CompletionRequest) -> Result<String, Error> + Send + Sync;

/// Language model answering through a closure and recording every request.
#[derive(Clone)]
pub struct MockLanguageModel {
    respond: Arc<Responder>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockLanguageModel {
    pub fn new(respond: impl Fn(&CompletionRequest) -> Result<String, Error> + Send + Sync + 'static) -> Self {
        Self { respond: Arc::new(respond), requests: Arc::default() }
    }

    pub fn calls(&self) -> usize {
        self.requests().len()
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LanguageModel for MockLanguageModel {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, Error> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        (self.respond)(request)
    }
}

/// Extraction response listing `(name, source_rank)` pairs.
pub fn extraction_json(restaurants: &[(&str, f64)]) -> String {
    let items: Vec<_> = restaurants
        .iter()
        .map(|(name, rank)| {
            json!({
                "name": name,
                "description": format!("{name} is a favorite."),
                "cuisine_type": "American",
                "price_range": "",
                "booking_website": "",
                "source_rank": rank,
                "ranking_reason": "",
            })
        })
        .collect();
    json!({ "restaurants": items }).to_string()
}

/// Pipeline over the built-in registry with an enabled cache in a temp dir.
pub fn discovery_with(search: MockSearchProvider, llm: MockLanguageModel) -> (Discovery, TempDir) {
    discovery_for(&AppConfig::default(), search, llm)
}

pub fn discovery_for(config: &AppConfig, search: MockSearchProvider, llm: MockLanguageModel) -> (Discovery, TempDir) {
    let dir = TempDir::new().expect("temp dir");
    let cache = ResponseCache::new(dir.path(), Duration::from_secs(24 * 3600), true);
    (Discovery::new(config, Arc::new(search), Arc::new(llm), cache), dir)
}
