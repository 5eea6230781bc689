//! The discovery pipeline: acquisition, extraction, and evaluation.
//!
//! Three strategies run side by side and their per-source results are
//! unioned and deduplicated:
//!
//! - known URLs: extract list pages directly, crawling when a page is thin
//! - source search: canned queries per publication, optionally domain-scoped
//! - deep crawl: map a list page, extract each matching restaurant page
//!
//! Failures are isolated to the smallest unit that produced them (URL,
//! chunk, source, restaurant) and reported, never propagated to siblings.

pub mod deep_crawl;
pub mod evaluate;
pub mod extraction;
pub mod known_urls;
pub mod pool;
pub mod prompts;
pub mod source_search;

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use crate::Error;
use crate::cache::{CacheKind, ResponseCache, search_identifier};
use crate::config::{AppConfig, SourceConfig};
use crate::dedup::dedupe;
use crate::provider::{LanguageModel, SearchProvider, SearchQuery, Traversal};
use crate::restaurant::Restaurant;
use crate::url::page_key;

pub use pool::{TaskReport, fan_out};

const STRATEGY_POOL: usize = 3;

/// Joins crawled pages of one URL.
const CRAWL_PAGE_SEPARATOR: &str = "\n\n---\n\n";

/// One acquisition method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    KnownUrls,
    SourceSearch,
    DeepCrawl,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::KnownUrls, Strategy::SourceSearch, Strategy::DeepCrawl];

    pub fn label(&self) -> &'static str {
        match self {
            Strategy::KnownUrls => "known URLs",
            Strategy::SourceSearch => "source search",
            Strategy::DeepCrawl => "deep crawl",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A source that produced nothing because its processing failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceFailure {
    pub strategy: Strategy,
    pub source: String,
    pub error: String,
}

impl fmt::Display for SourceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.source, self.strategy, self.error)
    }
}

/// Per-source results of one strategy.
#[derive(Debug, Default)]
pub struct StrategyOutcome {
    pub by_source: BTreeMap<String, Vec<Restaurant>>,
    pub failures: Vec<SourceFailure>,
}

impl StrategyOutcome {
    /// Split fan-out reports into successes and failures.
    pub fn from_reports(strategy: Strategy, reports: Vec<TaskReport<Vec<Restaurant>>>) -> Self {
        let mut outcome = Self::default();
        for report in reports {
            match report.outcome {
                Ok(restaurants) => {
                    tracing::info!(%strategy, source = %report.label, count = restaurants.len(), "source done");
                    outcome.by_source.entry(report.label).or_default().extend(restaurants);
                }
                Err(e) => {
                    tracing::warn!(%strategy, source = %report.label, error = %e, "source failed");
                    outcome.failures.push(SourceFailure { strategy, source: report.label, error: e.to_string() });
                }
            }
        }
        outcome
    }

    pub fn restaurant_count(&self) -> usize {
        self.by_source.values().map(Vec::len).sum()
    }
}

/// Combined result of all strategies.
#[derive(Debug, Default)]
pub struct Acquisition {
    /// Deduplicated union across strategies.
    pub restaurants: Vec<Restaurant>,
    /// Records found per source before cross-strategy dedup.
    pub found_per_source: BTreeMap<String, usize>,
    pub failures: Vec<SourceFailure>,
    /// Whole-strategy failures.
    pub errors: Vec<String>,
}

impl Acquisition {
    /// Nothing succeeded and something failed.
    pub fn is_total_failure(&self) -> bool {
        self.restaurants.is_empty()
            && self.found_per_source.is_empty()
            && (!self.failures.is_empty() || !self.errors.is_empty())
    }
}

/// Pipeline handle. Clones share the collaborators.
#[derive(Clone)]
pub struct Discovery {
    search: Arc<dyn SearchProvider>,
    llm: Arc<dyn LanguageModel>,
    cache: ResponseCache,
    sources: Arc<[SourceConfig]>,
    location: String,
    min_priority_rank: f64,
}

impl fmt::Debug for Discovery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Discovery")
            .field("location", &self.location)
            .field("sources", &self.sources.len())
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl Discovery {
    pub fn new(
        config: &AppConfig, search: Arc<dyn SearchProvider>, llm: Arc<dyn LanguageModel>, cache: ResponseCache,
    ) -> Self {
        Self {
            search,
            llm,
            cache,
            sources: config.sources.clone().into(),
            location: config.location.clone(),
            min_priority_rank: config.min_priority_rank,
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Run all three strategies and union their results.
    pub async fn acquire(&self) -> Acquisition {
        let started = Instant::now();
        let items: Vec<(String, Strategy)> = Strategy::ALL.iter().map(|s| (s.label().to_string(), *s)).collect();

        let this = self.clone();
        let reports = fan_out(items, STRATEGY_POOL, move |strategy| {
            let this = this.clone();
            async move { Ok(this.run_strategy(strategy).await) }
        })
        .await;

        let mut acquisition = Acquisition::default();
        let mut union = Vec::new();

        for report in reports {
            match report.outcome {
                Ok(outcome) => {
                    tracing::info!(
                        strategy = %report.label,
                        count = outcome.restaurant_count(),
                        sources = outcome.by_source.len(),
                        failed = outcome.failures.len(),
                        "strategy done"
                    );
                    for (source, restaurants) in outcome.by_source {
                        *acquisition.found_per_source.entry(source).or_default() += restaurants.len();
                        union.extend(restaurants);
                    }
                    acquisition.failures.extend(outcome.failures);
                }
                Err(e) => {
                    tracing::error!(strategy = %report.label, error = %e, "strategy failed");
                    acquisition.errors.push(format!("Strategy {} failed: {e}", report.label));
                }
            }
        }

        let found = union.len();
        acquisition.restaurants = dedupe(union);

        tracing::info!(
            found,
            unique = acquisition.restaurants.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "acquisition complete"
        );
        acquisition
    }

    async fn run_strategy(&self, strategy: Strategy) -> StrategyOutcome {
        match strategy {
            Strategy::KnownUrls => self.known_urls().await,
            Strategy::SourceSearch => self.source_search().await,
            Strategy::DeepCrawl => self.deep_crawl().await,
        }
    }

    /// Cached page text for `url`, if any.
    async fn cached_page(&self, url: &str) -> Option<String> {
        self.cache
            .get::<String>(url, CacheKind::Extract)
            .await
            .filter(|text| !text.trim().is_empty())
    }

    /// Extract `urls` in one provider call, caching each page with content.
    /// Returns `(requested url, text)` in request order; unreadable pages are omitted.
    async fn extract_uncached(&self, urls: &[String]) -> Result<Vec<(String, String)>, Error> {
        if urls.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(count = urls.len(), "extracting pages");
        let pages = self.search.extract(urls).await?;

        let by_key: HashMap<String, String> = pages
            .into_iter()
            .filter(|page| !page.raw_content.trim().is_empty())
            .map(|page| (page_key(&page.url), page.raw_content))
            .collect();

        let mut found = Vec::new();
        for url in urls {
            if let Some(text) = by_key.get(&page_key(url)) {
                self.cache.set(url, CacheKind::Extract, text).await;
                found.push((url.clone(), text.clone()));
            }
        }
        Ok(found)
    }

    /// Shallow crawl of a single page (depth 1, breadth 1, limit 1).
    async fn crawl_page(&self, url: &str) -> Result<String, Error> {
        if let Some(text) = self.cache.get::<String>(url, CacheKind::Crawl).await {
            return Ok(text);
        }

        let pages = self.search.crawl(&Traversal::new(url, 1, 1, 1)).await?;
        let text = pages
            .into_iter()
            .filter(|page| !page.trim().is_empty())
            .collect::<Vec<_>>()
            .join(CRAWL_PAGE_SEPARATOR);

        if !text.is_empty() {
            self.cache.set(url, CacheKind::Crawl, &text).await;
        }
        Ok(text)
    }

    /// Result texts for one search, cached by `query|domain`.
    async fn search_texts(&self, query: &SearchQuery) -> Result<Vec<String>, Error> {
        let identifier = search_identifier(&query.query, query.domain.as_deref());
        if let Some(texts) = self.cache.get::<Vec<String>>(&identifier, CacheKind::Search).await
            && !texts.is_empty()
        {
            return Ok(texts);
        }

        let hits = self.search.search(query).await?;
        let texts: Vec<String> = hits
            .iter()
            .map(|hit| hit.best_text())
            .filter(|text| !text.trim().is_empty())
            .map(str::to_string)
            .collect();

        if !texts.is_empty() {
            self.cache.set(&identifier, CacheKind::Search, &texts).await;
        }
        Ok(texts)
    }
}
