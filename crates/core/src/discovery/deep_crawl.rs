//! Deep-crawl strategy: map a list page, then extract each restaurant page.

use regex::Regex;

use super::{Discovery, Strategy, StrategyOutcome, fan_out};
use crate::Error;
use crate::cache::CacheKind;
use crate::config::{DeepCrawlConfig, SourceConfig};
use crate::provider::Traversal;
use crate::restaurant::Restaurant;
use crate::url::unique_links;

/// Uncached pages per extract call.
pub const EXTRACT_BATCH: usize = 10;

const BATCH_POOL: usize = 3;

const SOURCE_POOL: usize = 3;

const PAGE_SEPARATOR: &str = "\n\n---RESTAURANT PAGE---\n\n";

impl Discovery {
    pub async fn deep_crawl(&self) -> StrategyOutcome {
        let items: Vec<(String, (SourceConfig, DeepCrawlConfig))> = self
            .sources
            .iter()
            .filter_map(|s| s.deep_crawl.clone().map(|deep| (s.name.clone(), (s.clone(), deep))))
            .collect();

        let this = self.clone();
        let reports = fan_out(items, SOURCE_POOL, move |(source, deep)| {
            let this = this.clone();
            async move { this.crawl_source(&source, &deep).await }
        })
        .await;

        StrategyOutcome::from_reports(Strategy::DeepCrawl, reports)
    }

    async fn crawl_source(&self, source: &SourceConfig, deep: &DeepCrawlConfig) -> Result<Vec<Restaurant>, Error> {
        let links = self.restaurant_links(deep).await?;
        if links.is_empty() {
            tracing::warn!(source = %source.name, list_url = %deep.list_url, "no restaurant pages matched");
            return Ok(Vec::new());
        }

        let pages = self.restaurant_pages(&links).await;
        tracing::info!(source = %source.name, links = links.len(), pages = pages.len(), "restaurant pages collected");
        if pages.is_empty() {
            return Ok(Vec::new());
        }

        let combined = pages.join(PAGE_SEPARATOR);
        Ok(self.extract(&format!("{} (deep)", source.name), &combined).await)
    }

    /// Links under the list page matching the restaurant pattern, first
    /// occurrence kept, capped at `max_restaurants`.
    async fn restaurant_links(&self, deep: &DeepCrawlConfig) -> Result<Vec<String>, Error> {
        let pattern = Regex::new(&deep.restaurant_url_pattern)
            .map_err(|e| Error::InvalidInput(format!("restaurant_url_pattern: {e}")))?;

        let mapped = match self.cache.get::<Vec<String>>(&deep.list_url, CacheKind::Map).await {
            Some(links) => links,
            None => {
                let traversal = Traversal::new(&deep.list_url, deep.max_depth, deep.max_breadth, deep.limit);
                let links = self.search.map(&traversal).await?;
                if !links.is_empty() {
                    self.cache.set(&deep.list_url, CacheKind::Map, &links).await;
                }
                links
            }
        };

        let total = mapped.len();
        let mut links = unique_links(mapped.into_iter().filter(|link| pattern.is_match(link)));
        links.truncate(deep.max_restaurants);

        tracing::debug!(list_url = %deep.list_url, total, matched = links.len(), "list page mapped");
        Ok(links)
    }

    /// Page texts in link order. Cached pages skip the provider; a failed
    /// batch contributes nothing.
    async fn restaurant_pages(&self, links: &[String]) -> Vec<String> {
        let mut texts: Vec<Option<String>> = Vec::with_capacity(links.len());
        for link in links {
            texts.push(self.cached_page(link).await);
        }

        let uncached: Vec<String> = links
            .iter()
            .zip(&texts)
            .filter(|(_, text)| text.is_none())
            .map(|(link, _)| link.clone())
            .collect();

        let batches: Vec<(String, Vec<String>)> = uncached
            .chunks(EXTRACT_BATCH)
            .enumerate()
            .map(|(idx, batch)| (format!("batch {}", idx + 1), batch.to_vec()))
            .collect();

        let this = self.clone();
        let reports = fan_out(batches, BATCH_POOL, move |batch| {
            let this = this.clone();
            async move { this.extract_uncached(&batch).await }
        })
        .await;

        for report in reports {
            match report.outcome {
                Ok(found) => {
                    for (url, text) in found {
                        if let Some(idx) = links.iter().position(|link| *link == url) {
                            texts[idx] = Some(text);
                        }
                    }
                }
                Err(e) => tracing::warn!(batch = %report.label, error = %e, "page batch failed"),
            }
        }

        texts.into_iter().flatten().collect()
    }
}
