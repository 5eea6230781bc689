//! On-disk cache operations.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use tokio::fs;

use super::{CacheKind, hash::cache_key};
use crate::Error;
use crate::config::AppConfig;

/// Serialized form of one cache file.
#[derive(Debug, Serialize, Deserialize)]
struct Entry<T> {
    /// Seconds since the Unix epoch when the entry was written.
    timestamp: f64,
    identifier: String,
    content: T,
}

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

fn now_secs() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

/// Result of a bulk purge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClearReport {
    pub files_removed: usize,
    pub errors: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KindStats {
    pub files: usize,
    pub size_kb: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    pub enabled: bool,
    pub ttl_hours: u64,
    pub total_files: usize,
    pub total_size_kb: f64,
    pub cache_types: BTreeMap<String, KindStats>,
}

/// Response cache handle. Cheap to clone; holds no open files.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    root: PathBuf,
    ttl: Duration,
    enabled: bool,
}

impl ResponseCache {
    pub fn new(root: impl Into<PathBuf>, ttl: Duration, enabled: bool) -> Self {
        Self { root: root.into(), ttl, enabled }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.cache_dir, config.cache_ttl(), config.cache_enabled)
    }

    /// A cache that never stores or returns anything.
    pub fn disabled() -> Self {
        Self::new(PathBuf::new(), Duration::ZERO, false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, kind: CacheKind, identifier: &str) -> PathBuf {
        self.root.join(kind.as_str()).join(format!("{}.json", cache_key(identifier)))
    }

    fn is_expired(&self, timestamp: f64) -> bool {
        now_secs() - timestamp > self.ttl.as_secs_f64()
    }

    async fn discard(&self, path: &Path) {
        if let Err(e) = fs::remove_file(path).await
            && e.kind() != ErrorKind::NotFound
        {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove cache entry");
        }
    }

    /// Fetch a fresh entry. Missing, expired, corrupt, and mistyped entries
    /// all read as absent; the last three are removed.
    pub async fn get<T: DeserializeOwned>(&self, identifier: &str, kind: CacheKind) -> Option<T> {
        if !self.enabled {
            return None;
        }

        let path = self.entry_path(kind, identifier);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(%kind, identifier, error = %e, "cache read failed");
                return None;
            }
        };

        let entry: Entry<Value> = match serde_json::from_slice(&bytes) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!(%kind, identifier, error = %e, "discarding corrupt cache entry");
                self.discard(&path).await;
                return None;
            }
        };

        if self.is_expired(entry.timestamp) {
            tracing::debug!(%kind, identifier, "cache entry expired");
            self.discard(&path).await;
            return None;
        }

        match serde_json::from_value(entry.content) {
            Ok(content) => {
                tracing::debug!(%kind, identifier, "cache hit");
                Some(content)
            }
            Err(e) => {
                tracing::debug!(%kind, identifier, error = %e, "discarding mistyped cache entry");
                self.discard(&path).await;
                None
            }
        }
    }

    /// Store an entry. Failures are logged and otherwise ignored.
    pub async fn set<T: Serialize>(&self, identifier: &str, kind: CacheKind, content: &T) {
        if !self.enabled {
            return;
        }

        if let Err(e) = self.write_entry(identifier, kind, content).await {
            tracing::warn!(%kind, identifier, error = %e, "failed to cache response");
        }
    }

    async fn write_entry<T: Serialize>(&self, identifier: &str, kind: CacheKind, content: &T) -> Result<(), Error> {
        let path = self.entry_path(kind, identifier);
        let dir = self.root.join(kind.as_str());
        fs::create_dir_all(&dir).await?;

        let entry = Entry { timestamp: now_secs(), identifier: identifier.to_string(), content };
        let body = serde_json::to_vec_pretty(&entry).map_err(|e| Error::Cache(e.to_string()))?;

        let tmp = path.with_extension(format!(
            "json.tmp-{}-{}",
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        fs::write(&tmp, body).await?;

        if let Err(e) = fs::rename(&tmp, &path).await {
            self.discard(&tmp).await;
            return Err(e.into());
        }

        Ok(())
    }

    async fn kind_dirs(&self) -> Vec<(String, PathBuf)> {
        let mut dirs = Vec::new();
        let Ok(mut entries) = fs::read_dir(&self.root).await else {
            return dirs;
        };

        while let Ok(Some(entry)) = entries.next_entry().await {
            let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
            if is_dir {
                dirs.push((entry.file_name().to_string_lossy().into_owned(), entry.path()));
            }
        }

        dirs.sort();
        dirs
    }

    async fn entry_files(dir: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();
        let Ok(mut entries) = fs::read_dir(dir).await else {
            return files;
        };

        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
        files
    }

    /// Remove every entry of every kind.
    pub async fn clear(&self) -> ClearReport {
        let mut report = ClearReport::default();

        for (_, dir) in self.kind_dirs().await {
            for file in Self::entry_files(&dir).await {
                match fs::remove_file(&file).await {
                    Ok(()) => report.files_removed += 1,
                    Err(e) => {
                        tracing::warn!(path = %file.display(), error = %e, "failed to remove cache file");
                        report.errors += 1;
                    }
                }
            }
        }

        tracing::info!(files_removed = report.files_removed, errors = report.errors, "cache cleared");
        report
    }

    /// Entry counts and sizes per kind.
    pub async fn stats(&self) -> CacheStats {
        let mut stats = CacheStats {
            enabled: self.enabled,
            ttl_hours: self.ttl.as_secs() / 3600,
            total_files: 0,
            total_size_kb: 0.0,
            cache_types: BTreeMap::new(),
        };

        let mut total_bytes = 0u64;
        for (name, dir) in self.kind_dirs().await {
            let files = Self::entry_files(&dir).await;
            let mut bytes = 0u64;
            for file in &files {
                if let Ok(meta) = fs::metadata(file).await {
                    bytes += meta.len();
                }
            }

            stats.total_files += files.len();
            total_bytes += bytes;
            stats.cache_types.insert(name, KindStats { files: files.len(), size_kb: round_kb(bytes) });
        }

        stats.total_size_kb = round_kb(total_bytes);
        stats
    }
}

fn round_kb(bytes: u64) -> f64 {
    (bytes as f64 / 1024.0 * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cache(dir: &tempfile::TempDir) -> ResponseCache {
        ResponseCache::new(dir.path(), Duration::from_secs(24 * 3600), true)
    }

    #[tokio::test]
    async fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache(&dir);
        let payload = json!({"results": [{"url": "https://x.com", "content": "hi"}]});

        cache.set("k", CacheKind::Search, &payload).await;
        let got: Option<Value> = cache.get("k", CacheKind::Search).await;
        assert_eq!(got, Some(payload));
    }

    #[tokio::test]
    async fn test_kinds_are_separate() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache(&dir);

        cache.set("k", CacheKind::Search, &"search").await;
        assert_eq!(cache.get::<String>("k", CacheKind::Extract).await, None);
        assert_eq!(cache.get::<String>("k", CacheKind::Search).await.as_deref(), Some("search"));
    }

    #[tokio::test]
    async fn test_disabled_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(dir.path(), Duration::from_secs(3600), false);

        cache.set("k", CacheKind::Map, &vec!["a"]).await;
        assert_eq!(cache.get::<Vec<String>>("k", CacheKind::Map).await, None);
        assert!(!dir.path().join("map").exists());
    }

    #[tokio::test]
    async fn test_expired_entry_removed() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache(&dir);
        let path = cache.entry_path(CacheKind::Search, "old");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let stale = json!({"timestamp": now_secs() - 25.0 * 3600.0, "identifier": "old", "content": "x"});
        std::fs::write(&path, stale.to_string()).unwrap();

        assert_eq!(cache.get::<String>("old", CacheKind::Search).await, None);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_entry_within_ttl_survives() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache(&dir);
        let path = cache.entry_path(CacheKind::Search, "recent");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let recent = json!({"timestamp": now_secs() - 3600.0, "identifier": "recent", "content": "x"});
        std::fs::write(&path, recent.to_string()).unwrap();

        assert_eq!(cache.get::<String>("recent", CacheKind::Search).await.as_deref(), Some("x"));
    }

    #[tokio::test]
    async fn test_corrupt_entry_removed() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache(&dir);
        let path = cache.entry_path(CacheKind::Extract, "bad");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{not json").unwrap();

        assert_eq!(cache.get::<Value>("bad", CacheKind::Extract).await, None);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_mistyped_entry_removed() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache(&dir);
        cache.set("k", CacheKind::Map, &"not a list").await;

        assert_eq!(cache.get::<Vec<String>>("k", CacheKind::Map).await, None);
        assert_eq!(cache.get::<String>("k", CacheKind::Map).await, None);
    }

    #[tokio::test]
    async fn test_entry_file_shape() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache(&dir);
        cache.set("https://x.com", CacheKind::Crawl, &vec!["page"]).await;

        let raw = std::fs::read_to_string(cache.entry_path(CacheKind::Crawl, "https://x.com")).unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["identifier"], "https://x.com");
        assert_eq!(value["content"], json!(["page"]));
        assert!(value["timestamp"].as_f64().unwrap() > 0.0);
    }

    #[tokio::test]
    async fn test_concurrent_writers_distinct_keys() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache(&dir);

        let mut handles = Vec::new();
        for i in 0..20 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                cache.set(&format!("key-{i}"), CacheKind::Extract, &i).await;
                cache.set("shared", CacheKind::Extract, &i).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        for i in 0..20 {
            assert_eq!(cache.get::<i32>(&format!("key-{i}"), CacheKind::Extract).await, Some(i));
        }
        assert!(cache.get::<i32>("shared", CacheKind::Extract).await.is_some());
    }

    #[tokio::test]
    async fn test_clear_and_stats() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache(&dir);
        cache.set("a", CacheKind::Search, &"one").await;
        cache.set("b", CacheKind::Search, &"two").await;
        cache.set("c", CacheKind::Price, &"$$").await;

        let stats = cache.stats().await;
        assert!(stats.enabled);
        assert_eq!(stats.ttl_hours, 24);
        assert_eq!(stats.total_files, 3);
        assert_eq!(stats.cache_types["search"].files, 2);
        assert_eq!(stats.cache_types["price"].files, 1);
        assert!(stats.total_size_kb > 0.0);

        let report = cache.clear().await;
        assert_eq!(report, ClearReport { files_removed: 3, errors: 0 });
        assert_eq!(cache.stats().await.total_files, 0);
    }

    #[tokio::test]
    async fn test_stats_missing_root() {
        let cache = ResponseCache::new("/nonexistent/tastemaker-cache", Duration::from_secs(3600), true);
        let stats = cache.stats().await;
        assert_eq!(stats.total_files, 0);
        assert!(stats.cache_types.is_empty());
        assert_eq!(cache.clear().await, ClearReport::default());
    }
}
