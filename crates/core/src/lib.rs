//! Core types and the discovery pipeline for tastemaker.
//!
//! This crate provides:
//! - The restaurant record, price normalization, and rank aggregation
//! - Fuzzy deduplication and merge
//! - The three-strategy acquisition pipeline with a file-backed response cache
//! - The conversational agent state machine
//! - A SQLite-backed persisted list
//! - Unified error types and layered configuration

pub mod agent;
pub mod cache;
pub mod config;
pub mod dedup;
pub mod discovery;
pub mod error;
pub mod fuzzy;
pub mod price;
pub mod provider;
pub mod ranking;
pub mod restaurant;
pub mod store;
pub mod url;

#[cfg(test)]
pub(crate) mod testing;

pub use agent::{ApprovalDecision, RestaurantAgent, Session};
pub use cache::{CacheKind, ResponseCache};
pub use config::AppConfig;
pub use discovery::Discovery;
pub use error::Error;
pub use price::{PriceRange, normalize_price};
pub use provider::{LanguageModel, ListStore, SearchProvider};
pub use restaurant::Restaurant;
pub use store::SqliteListStore;
