//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `cache_ttl_hours` is 0
    /// - `timeout_ms` is less than 100ms or exceeds 10 minutes
    /// - `user_agent` or `location` is empty
    /// - `min_priority_rank` falls outside 0.0..=5.0
    /// - a deep-crawl pattern does not compile or caps at zero pages
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_ttl_hours == 0 {
            return Err(ConfigError::Invalid { field: "cache_ttl_hours".into(), reason: "must be at least 1".into() });
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 600_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 10 minutes (600000ms)".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if self.location.trim().is_empty() {
            return Err(ConfigError::Invalid { field: "location".into(), reason: "must not be empty".into() });
        }

        if !(0.0..=5.0).contains(&self.min_priority_rank) {
            return Err(ConfigError::Invalid {
                field: "min_priority_rank".into(),
                reason: "must be between 0.0 and 5.0".into(),
            });
        }

        for source in &self.sources {
            let Some(deep) = &source.deep_crawl else { continue };

            if let Err(e) = regex::Regex::new(&deep.restaurant_url_pattern) {
                return Err(ConfigError::Invalid {
                    field: format!("sources.{}.deep_crawl.restaurant_url_pattern", source.name),
                    reason: e.to_string(),
                });
            }
            if deep.max_restaurants == 0 {
                return Err(ConfigError::Invalid {
                    field: format!("sources.{}.deep_crawl.max_restaurants", source.name),
                    reason: "must be greater than 0".into(),
                });
            }
        }

        if self.sources.is_empty() {
            tracing::warn!("source registry is empty; discovery will find nothing");
        }

        Ok(())
    }
}
