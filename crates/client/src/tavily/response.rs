//! Tavily API response types and normalization.

use serde::Deserialize;
use tastemaker_core::provider::{ExtractedPage, SearchHit};

/// Raw `POST /search` response.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
pub struct SearchResult {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub raw_content: Option<String>,
}

impl From<SearchResult> for SearchHit {
    fn from(r: SearchResult) -> Self {
        SearchHit { url: r.url, title: r.title, content: r.content, raw_content: r.raw_content }
    }
}

/// Raw `POST /extract` response.
#[derive(Debug, Deserialize)]
pub struct ExtractResponse {
    #[serde(default)]
    pub results: Vec<PageResult>,
    #[serde(default)]
    pub failed_results: Vec<FailedResult>,
}

/// One page from `/extract` or `/crawl`.
#[derive(Debug, Deserialize)]
pub struct PageResult {
    pub url: String,
    #[serde(default)]
    pub raw_content: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl PageResult {
    /// Full page text, falling back to the summary content.
    pub fn into_text(self) -> String {
        match self.raw_content {
            Some(raw) if !raw.trim().is_empty() => raw,
            _ => self.content.unwrap_or_default(),
        }
    }
}

impl From<PageResult> for ExtractedPage {
    fn from(page: PageResult) -> Self {
        let url = page.url.clone();
        ExtractedPage { url, raw_content: page.into_text() }
    }
}

#[derive(Debug, Deserialize)]
pub struct FailedResult {
    pub url: String,
    #[serde(default)]
    pub error: String,
}

/// Raw `POST /crawl` response.
#[derive(Debug, Deserialize)]
pub struct CrawlResponse {
    #[serde(default)]
    pub results: Vec<PageResult>,
}

/// Raw `POST /map` response.
#[derive(Debug, Deserialize)]
pub struct MapResponse {
    #[serde(default)]
    pub results: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_FIXTURE: &str = r#"{
        "query": "best restaurants",
        "results": [
            {"url": "https://a.com", "title": "A", "content": "snippet a", "raw_content": "full a", "score": 0.9},
            {"url": "https://b.com", "title": "B", "content": "snippet b", "raw_content": null, "score": 0.5}
        ],
        "response_time": 1.2
    }"#;

    #[test]
    fn test_deserialize_search() {
        let response: SearchResponse = serde_json::from_str(SEARCH_FIXTURE).unwrap();
        let hits: Vec<SearchHit> = response.results.into_iter().map(SearchHit::from).collect();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].best_text(), "full a");
        assert_eq!(hits[1].best_text(), "snippet b");
    }

    #[test]
    fn test_deserialize_extract_with_failures() {
        let json = r#"{
            "results": [{"url": "https://a.com", "raw_content": "page a"}],
            "failed_results": [{"url": "https://b.com", "error": "timeout"}]
        }"#;
        let response: ExtractResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.failed_results[0].error, "timeout");
        let page = ExtractedPage::from(response.results.into_iter().next().unwrap());
        assert_eq!(page.raw_content, "page a");
    }

    #[test]
    fn test_crawl_page_falls_back_to_content() {
        let json = r#"{"base_url": "https://a.com", "results": [{"url": "https://a.com/x", "content": "summary"}]}"#;
        let response: CrawlResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.results.into_iter().next().unwrap().into_text(), "summary");
    }

    #[test]
    fn test_deserialize_map() {
        let json = r#"{"base_url": "https://a.com", "results": ["https://a.com/1", "https://a.com/2"]}"#;
        let response: MapResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.results.len(), 2);
    }
}
