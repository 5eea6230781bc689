//! Source registry: which publications we trust and how to reach them.

use serde::{Deserialize, Serialize};

/// One authoritative publication and the ways we acquire its lists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceConfig {
    /// Display name, also used to route ranks (e.g. "Eater DC").
    pub name: String,

    /// Restrict tailored searches to this domain.
    #[serde(default)]
    pub domain: Option<String>,

    /// Canned queries for the tailored-search strategy, issued in order.
    #[serde(default)]
    pub search_queries: Vec<String>,

    /// List pages extracted directly by the known-URL strategy.
    #[serde(default)]
    pub known_urls: Vec<String>,

    /// Present when the list page only names restaurants and detail lives on child pages.
    #[serde(default)]
    pub deep_crawl: Option<DeepCrawlConfig>,
}

/// Parameters for the map-then-extract deep crawl.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeepCrawlConfig {
    pub list_url: String,

    /// Regex a discovered link must match to count as a restaurant page.
    #[serde(default = "default_url_pattern")]
    pub restaurant_url_pattern: String,

    #[serde(default = "default_max_restaurants")]
    pub max_restaurants: usize,

    #[serde(default = "default_map_depth")]
    pub max_depth: u32,

    #[serde(default = "default_map_breadth")]
    pub max_breadth: u32,

    #[serde(default = "default_map_limit")]
    pub limit: u32,
}

fn default_url_pattern() -> String {
    ".*".into()
}

fn default_max_restaurants() -> usize {
    30
}

fn default_map_depth() -> u32 {
    2
}

fn default_map_breadth() -> u32 {
    100
}

fn default_map_limit() -> u32 {
    300
}

impl SourceConfig {
    fn new(name: &str, domain: &str) -> Self {
        Self {
            name: name.into(),
            domain: Some(domain.into()),
            search_queries: Vec::new(),
            known_urls: Vec::new(),
            deep_crawl: None,
        }
    }

    fn queries(mut self, queries: &[&str]) -> Self {
        self.search_queries = queries.iter().map(|q| q.to_string()).collect();
        self
    }

    fn urls(mut self, urls: &[&str]) -> Self {
        self.known_urls = urls.iter().map(|u| u.to_string()).collect();
        self
    }

    /// Queries to run for this source, falling back to a generic one.
    pub fn queries_for(&self, location: &str) -> Vec<String> {
        if self.search_queries.is_empty() {
            vec![format!("best restaurants {location}")]
        } else {
            self.search_queries.clone()
        }
    }
}

/// Built-in registry for the Washington DC publications.
pub fn default_sources() -> Vec<SourceConfig> {
    vec![
        SourceConfig::new("Eater DC", "dc.eater.com")
            .queries(&[
                "Eater DC essential restaurants Washington DC",
                "Eater DC heatmap hottest new restaurants",
            ])
            .urls(&[
                "https://dc.eater.com/maps/best-restaurants-washington-dc-38",
                "https://dc.eater.com/maps/best-new-restaurants-dc-heatmap",
            ]),
        SourceConfig {
            deep_crawl: Some(DeepCrawlConfig {
                list_url: "https://guide.michelin.com/us/en/washington/washington-dc/restaurants".into(),
                restaurant_url_pattern: r"/us/en/washington/washington-dc/restaurant/[a-z0-9-]+/?$".into(),
                max_restaurants: default_max_restaurants(),
                max_depth: default_map_depth(),
                max_breadth: default_map_breadth(),
                limit: default_map_limit(),
            }),
            ..SourceConfig::new("Michelin Guide", "guide.michelin.com")
                .queries(&["Michelin Guide Washington DC starred restaurants"])
        },
        SourceConfig::new("Washington Post Food", "washingtonpost.com")
            .queries(&["Washington Post Tom Sietsema best restaurants DC dining guide"]),
        SourceConfig::new("Washingtonian Magazine", "washingtonian.com")
            .queries(&["Washingtonian 100 very best restaurants"])
            .urls(&["https://www.washingtonian.com/2024/02/13/the-100-very-best-restaurants-in-washington/"]),
        SourceConfig::new("Infatuation", "theinfatuation.com")
            .queries(&["The Infatuation best restaurants Washington DC"])
            .urls(&["https://www.theinfatuation.com/washington-dc/guides/best-restaurants-dc"]),
    ]
}
