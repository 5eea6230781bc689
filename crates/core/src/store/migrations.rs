//! Schema migrations for the list database.
//!
//! Applied migrations are recorded in `schema_migrations`; each one runs in
//! its own transaction together with its bookkeeping row.

use crate::Error;
use tokio_rusqlite::{Connection, params, rusqlite};

struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] =
    &[Migration { version: 1, name: "restaurants", sql: include_str!("../../migrations/001_restaurants.sql") }];

fn current_version(conn: &rusqlite::Connection) -> rusqlite::Result<i64> {
    conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_migrations", [], |row| row.get(0))
}

/// Bring the schema up to date.
///
/// # Errors
///
/// [`Error::MigrationFailed`] naming the first migration that did not apply.
pub async fn run(conn: &Connection) -> Result<(), Error> {
    conn.call(|conn| -> Result<(), Error> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at TEXT NOT NULL
            )",
        )?;

        let applied = current_version(conn)?;
        for migration in MIGRATIONS.iter().filter(|m| m.version > applied) {
            let failed = |e: rusqlite::Error| {
                Error::MigrationFailed(format!("{:03}_{}: {e}", migration.version, migration.name))
            };

            let tx = conn.transaction().map_err(failed)?;
            tx.execute_batch(migration.sql).map_err(failed)?;
            tx.execute(
                "INSERT INTO schema_migrations (version, name, applied_at) VALUES (?1, ?2, ?3)",
                params![migration.version, migration.name, chrono::Utc::now().to_rfc3339()],
            )
            .map_err(failed)?;
            tx.commit().map_err(failed)?;

            tracing::info!(version = migration.version, name = migration.name, "applied migration");
        }

        Ok(())
    })
    .await
    .map_err(Error::from)
}

/// Highest applied migration version, 0 for a fresh database.
pub async fn schema_version(conn: &Connection) -> Result<i64, Error> {
    conn.call(|conn| current_version(conn)).await.map_err(Error::from)
}
