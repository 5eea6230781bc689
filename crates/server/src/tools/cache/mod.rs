//! Cache-related MCP tools.
//!
//! This module provides tools for inspecting and purging the response cache.

pub mod clear;
pub mod stats;

pub use clear::{CacheClearParams, clear_impl};
pub use stats::{CacheStatsParams, stats_impl};
