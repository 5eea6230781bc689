//! File-backed, TTL-based cache for provider responses.
//!
//! Each entry is one JSON file under a directory per [`CacheKind`], named by
//! the SHA-256 of its identifier:
//!
//! - Lazy expiry: stale entries are removed on the read that finds them
//! - Corrupt entries are treated as absent and removed
//! - Writes land in a temporary sibling and are renamed into place, so no
//!   reader observes a torn entry and keys never share storage

pub mod files;
pub mod hash;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use files::{CacheStats, ClearReport, KindStats, ResponseCache};
pub use hash::{cache_key, price_identifier, search_identifier};

/// Namespace for cached responses, one directory each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheKind {
    Search,
    Extract,
    Crawl,
    Map,
    Price,
}

impl CacheKind {
    pub const ALL: [CacheKind; 5] = [CacheKind::Search, CacheKind::Extract, CacheKind::Crawl, CacheKind::Map, CacheKind::Price];

    pub fn as_str(&self) -> &'static str {
        match self {
            CacheKind::Search => "search",
            CacheKind::Extract => "extract",
            CacheKind::Crawl => "crawl",
            CacheKind::Map => "map",
            CacheKind::Price => "price",
        }
    }
}

impl fmt::Display for CacheKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
