//! URL canonicalization for matching provider results back to requests.

use std::collections::HashSet;

use crate::Error;

/// Canonicalize a URL string.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Default scheme to https:// if missing
/// 3. Lowercase the host
/// 4. Remove fragment (#...)
/// 5. Keep query string intact (do not reorder)
pub fn canonicalize(input: &str) -> Result<url::Url, Error> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(Error::InvalidInput("empty URL".into()));
    }

    let url_str = if trimmed.contains("://") { trimmed.to_string() } else { format!("https://{trimmed}") };

    let mut parsed = url::Url::parse(&url_str).map_err(|e| Error::InvalidInput(format!("invalid URL {trimmed}: {e}")))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(Error::InvalidInput(format!("unsupported scheme: {scheme}"))),
    }

    if let Some(host) = parsed.host_str().map(str::to_lowercase) {
        parsed
            .set_host(Some(&host))
            .map_err(|e| Error::InvalidInput(e.to_string()))?;
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

/// Comparison key: canonical form without scheme or trailing slash, so
/// `http://x.com/a/` and `https://X.com/a` collide. Unparseable input keys on itself.
pub fn page_key(input: &str) -> String {
    match canonicalize(input) {
        Ok(url) => {
            let host = url.host_str().unwrap_or_default();
            let path = url.path().trim_end_matches('/');
            match url.query() {
                Some(query) => format!("{host}{path}?{query}"),
                None => format!("{host}{path}"),
            }
        }
        Err(_) => input.trim().to_string(),
    }
}

/// Drop repeated links (by [`page_key`]) keeping first-seen order.
pub fn unique_links(links: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    links.into_iter().filter(|link| seen.insert(page_key(link))).collect()
}
