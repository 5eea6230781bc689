//! Tailored-search strategy: canned queries per publication.

use super::{Discovery, Strategy, StrategyOutcome, fan_out};
use crate::Error;
use crate::config::SourceConfig;
use crate::provider::SearchQuery;
use crate::restaurant::Restaurant;

const SOURCE_POOL: usize = 6;

const RESULTS_PER_QUERY: u32 = 5;

impl Discovery {
    pub async fn source_search(&self) -> StrategyOutcome {
        let items: Vec<(String, SourceConfig)> = self.sources.iter().map(|s| (s.name.clone(), s.clone())).collect();

        let this = self.clone();
        let reports = fan_out(items, SOURCE_POOL, move |source| {
            let this = this.clone();
            async move { this.search_source(&source).await }
        })
        .await;

        StrategyOutcome::from_reports(Strategy::SourceSearch, reports)
    }

    /// Queries run in order. The source fails only when every query did.
    async fn search_source(&self, source: &SourceConfig) -> Result<Vec<Restaurant>, Error> {
        let queries = source.queries_for(&self.location);
        let mut pieces = Vec::new();
        let mut failed = 0;
        let mut last_error = None;

        for query in &queries {
            let request = SearchQuery::new(query.as_str())
                .domain(source.domain.as_deref())
                .max_results(RESULTS_PER_QUERY)
                .raw_content();

            match self.search_texts(&request).await {
                Ok(texts) => {
                    tracing::debug!(source = %source.name, query, hits = texts.len(), "search done");
                    pieces.extend(texts);
                }
                Err(e) => {
                    tracing::warn!(source = %source.name, query, error = %e, "search failed");
                    failed += 1;
                    last_error = Some(e);
                }
            }
        }

        if failed == queries.len()
            && let Some(e) = last_error
        {
            return Err(e);
        }

        let content = pieces.join("\n\n");
        // `extract` already merges duplicates across chunks.
        Ok(self.extract(&source.name, &content).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::testing::{MockLanguageModel, MockSearchProvider, discovery_for, extraction_json};

    fn config(queries: &[&str]) -> AppConfig {
        AppConfig {
            sources: vec![SourceConfig {
                name: "Washingtonian Magazine".into(),
                domain: Some("washingtonian.com".into()),
                search_queries: queries.iter().map(|q| q.to_string()).collect(),
                known_urls: vec![],
                deep_crawl: None,
            }],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_partial_query_failure_keeps_source() {
        let search = MockSearchProvider::new().failing_query("q1").with_search("q2", &["Albi is great", "Moon Rabbit"]);
        let llm = MockLanguageModel::new(|_| Ok(extraction_json(&[("Albi", 4.0)])));

        let (discovery, _dir) = discovery_for(&config(&["q1", "q2"]), search.clone(), llm.clone());
        let outcome = discovery.source_search().await;

        assert!(outcome.failures.is_empty());
        assert_eq!(search.search_calls(), 2);
        let found = &outcome.by_source["Washingtonian Magazine"];
        assert_eq!(found[0].ranks.washingtonian_rank, 4.0);
        assert!(llm.requests()[0].user.contains("Albi is great\n\nMoon Rabbit"));
    }

    #[tokio::test]
    async fn test_duplicates_within_source_are_merged() {
        let search = MockSearchProvider::new().with_search("q1", &["Rose's Luxury"]);
        let llm =
            MockLanguageModel::new(|_| Ok(extraction_json(&[("Rose's Luxury", 5.0), ("rose's luxury : dc", 3.0)])));

        let (discovery, _dir) = discovery_for(&config(&["q1"]), search, llm);
        let outcome = discovery.source_search().await;

        let found = &outcome.by_source["Washingtonian Magazine"];
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Rose's Luxury");
    }

    #[tokio::test]
    async fn test_all_queries_failing_fails_source() {
        let search = MockSearchProvider::new().failing_query("q1").failing_query("q2");
        let llm = MockLanguageModel::new(|_| Ok(extraction_json(&[])));

        let (discovery, _dir) = discovery_for(&config(&["q1", "q2"]), search, llm.clone());
        let outcome = discovery.source_search().await;

        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].strategy, Strategy::SourceSearch);
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_generic_query_when_none_configured() {
        let search = MockSearchProvider::new().with_search("best restaurants Washington DC", &["Albi"]);
        let llm = MockLanguageModel::new(|_| Ok(extraction_json(&[("Albi", 3.0)])));

        let (discovery, _dir) = discovery_for(&config(&[]), search, llm);
        let outcome = discovery.source_search().await;

        assert_eq!(outcome.restaurant_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_results_yield_empty_source() {
        let llm = MockLanguageModel::new(|_| Ok(extraction_json(&[("Albi", 3.0)])));
        let (discovery, _dir) = discovery_for(&config(&["q1"]), MockSearchProvider::new(), llm.clone());

        let outcome = discovery.source_search().await;
        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.restaurant_count(), 0);
        assert_eq!(llm.calls(), 0);
    }
}
