//! SQLite-backed persisted list.
//!
//! Async access via tokio-rusqlite, WAL mode, and versioned migrations.
//! Names are unique case-insensitively.

pub mod connection;
pub mod migrations;
mod restaurants;

pub use connection::SqliteListStore;
