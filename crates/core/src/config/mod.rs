//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (TASTEMAKER_*)
//! 2. TOML config file (if TASTEMAKER_CONFIG_FILE set)
//! 3. Built-in defaults
//!
//! The loaded [`AppConfig`] is built once at startup and handed to the
//! pipeline explicitly.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod sources;
mod validation;

pub use sources::{DeepCrawlConfig, SourceConfig, default_sources};
pub use validation::ConfigError;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Tavily API key for search, extract, crawl and map.
    ///
    /// Set via TASTEMAKER_TAVILY_API_KEY. Required only when discovery runs.
    #[serde(default)]
    pub tavily_api_key: Option<String>,

    /// API key for the OpenAI-compatible chat endpoint.
    ///
    /// Set via TASTEMAKER_OPENAI_API_KEY.
    #[serde(default)]
    pub openai_api_key: Option<String>,

    /// Chat model used for extraction, enrichment and reasons.
    #[serde(default = "default_openai_model")]
    pub openai_model: String,

    /// Base URL of the chat-completions API.
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,

    /// City or region discovery is scoped to.
    #[serde(default = "default_location")]
    pub location: String,

    /// Whether the response cache is consulted at all.
    ///
    /// Set via TASTEMAKER_CACHE_ENABLED.
    #[serde(default = "default_true")]
    pub cache_enabled: bool,

    /// Root directory of the response cache.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Cache entry lifetime in hours.
    #[serde(default = "default_cache_ttl_hours")]
    pub cache_ttl_hours: u64,

    /// Path to the SQLite database holding the curated list.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// HTTP request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// User-Agent string for HTTP requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Discovered restaurants below this aggregate rank are dropped.
    #[serde(default = "default_min_priority_rank")]
    pub min_priority_rank: f64,

    /// Source registry.
    #[serde(default = "default_sources")]
    pub sources: Vec<SourceConfig>,
}

fn default_openai_model() -> String {
    "gpt-4o-mini".into()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".into()
}

fn default_location() -> String {
    "Washington DC".into()
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("./data/cache")
}

fn default_cache_ttl_hours() -> u64 {
    24
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./tastemaker.sqlite")
}

fn default_timeout_ms() -> u64 {
    60_000
}

fn default_user_agent() -> String {
    "tastemaker/0.1".into()
}

fn default_min_priority_rank() -> f64 {
    2.0
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tavily_api_key: None,
            openai_api_key: None,
            openai_model: default_openai_model(),
            openai_base_url: default_openai_base_url(),
            location: default_location(),
            cache_enabled: true,
            cache_dir: default_cache_dir(),
            cache_ttl_hours: default_cache_ttl_hours(),
            db_path: default_db_path(),
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
            min_priority_rank: default_min_priority_rank(),
            sources: default_sources(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Cache TTL as Duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_hours * 3600)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `TASTEMAKER_`
    /// 2. TOML file from `TASTEMAKER_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file or environment cannot be parsed, or
    /// validation fails after loading.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment())
    }

    /// The layered figment `load` extracts from.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("TASTEMAKER_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment.merge(
            Env::prefixed("TASTEMAKER_")
                .ignore(&["config_file"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        )
    }

    /// Extract and validate a config from an arbitrary figment.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Check if the Tavily API key is available (for deferred validation).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the key is not set.
    pub fn require_tavily_api_key(&self) -> Result<&str, ConfigError> {
        self.tavily_api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ConfigError::Missing {
                field: "tavily_api_key".into(),
                hint: "Set TASTEMAKER_TAVILY_API_KEY environment variable".into(),
            })
    }

    /// Check if the OpenAI API key is available.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the key is not set.
    pub fn require_openai_api_key(&self) -> Result<&str, ConfigError> {
        self.openai_api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ConfigError::Missing {
                field: "openai_api_key".into(),
                hint: "Set TASTEMAKER_OPENAI_API_KEY environment variable".into(),
            })
    }

    /// Look up a registry entry by name.
    pub fn source(&self, name: &str) -> Option<&SourceConfig> {
        self.sources.iter().find(|s| s.name == name)
    }
}
