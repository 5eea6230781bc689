//! Known-URL strategy: extract each source's list pages directly.

use super::{Discovery, Strategy, StrategyOutcome, fan_out};
use crate::Error;
use crate::config::SourceConfig;
use crate::restaurant::Restaurant;

/// Extracted pages shorter than this are retried with a shallow crawl.
pub const MIN_CONTENT_CHARS: usize = 1000;

const SOURCE_POOL: usize = 5;

const PAGE_BREAK: &str = "\n\n---PAGE BREAK---\n\n";

impl Discovery {
    pub async fn known_urls(&self) -> StrategyOutcome {
        let items: Vec<(String, SourceConfig)> = self
            .sources
            .iter()
            .filter(|s| !s.known_urls.is_empty())
            .map(|s| (s.name.clone(), s.clone()))
            .collect();

        let this = self.clone();
        let reports = fan_out(items, SOURCE_POOL, move |source| {
            let this = this.clone();
            async move { this.known_url_source(&source).await }
        })
        .await;

        StrategyOutcome::from_reports(Strategy::KnownUrls, reports)
    }

    /// All of one source's pages go to the model in a single extraction.
    async fn known_url_source(&self, source: &SourceConfig) -> Result<Vec<Restaurant>, Error> {
        let contents = self.known_url_contents(source).await?;

        let combined = contents
            .iter()
            .map(|(url, text)| format!("=== Content from {url} ===\n\n{text}"))
            .collect::<Vec<_>>()
            .join(PAGE_BREAK);

        tracing::info!(
            source = %source.name,
            urls = contents.len(),
            chars = combined.chars().count(),
            "extracting known URLs"
        );
        Ok(self.extract(&format!("{} (direct)", source.name), &combined).await)
    }

    /// Page text per URL: cache, then extract, then a crawl for thin or
    /// missing pages. Fails only when no URL yielded anything.
    async fn known_url_contents(&self, source: &SourceConfig) -> Result<Vec<(String, String)>, Error> {
        let mut texts: Vec<Option<String>> = Vec::with_capacity(source.known_urls.len());
        for url in &source.known_urls {
            texts.push(self.cached_page(url).await);
        }

        let uncached: Vec<String> = source
            .known_urls
            .iter()
            .zip(&texts)
            .filter(|(_, text)| text.is_none())
            .map(|(url, _)| url.clone())
            .collect();

        let mut last_error = None;
        match self.extract_uncached(&uncached).await {
            Ok(found) => {
                for (url, text) in found {
                    if let Some(idx) = source.known_urls.iter().position(|u| *u == url) {
                        texts[idx] = Some(text);
                    }
                }
            }
            Err(e) => {
                tracing::warn!(source = %source.name, error = %e, "extract failed, falling back to crawl");
                last_error = Some(e);
            }
        }

        let mut contents = Vec::new();
        for (url, text) in source.known_urls.iter().zip(texts) {
            let thin = text.as_ref().is_none_or(|t| t.chars().count() < MIN_CONTENT_CHARS);
            if !thin {
                contents.extend(text.map(|t| (url.clone(), t)));
                continue;
            }

            match self.crawl_page(url).await {
                Ok(crawled) if !crawled.trim().is_empty() => contents.push((url.clone(), crawled)),
                Ok(_) => {
                    tracing::debug!(source = %source.name, url, "crawl found nothing");
                    contents.extend(text.map(|t| (url.clone(), t)));
                }
                Err(e) => {
                    tracing::warn!(source = %source.name, url, error = %e, "crawl failed");
                    contents.extend(text.map(|t| (url.clone(), t)));
                    last_error = Some(e);
                }
            }
        }

        if contents.is_empty() {
            return Err(last_error
                .unwrap_or_else(|| Error::SearchFailed(format!("no content from known URLs of {}", source.name))));
        }
        Ok(contents)
    }
}
