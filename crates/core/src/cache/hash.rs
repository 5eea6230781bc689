//! Cache key and identifier construction.

use sha2::{Digest, Sha256};

/// File-name key for a logical identifier (URL, query, or composite).
///
/// Stable across calls and case-sensitive.
pub fn cache_key(identifier: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(identifier.as_bytes());
    hex::encode(hasher.finalize())
}

/// Identifier for a search, scoped by domain filter.
pub fn search_identifier(query: &str, domain: Option<&str>) -> String {
    format!("{query}|{}", domain.unwrap_or("all"))
}

/// Identifier for a price-enrichment lookup.
pub fn price_identifier(name: &str, location: &str) -> String {
    format!("price:{name}|{location}")
}
