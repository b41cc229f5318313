//! SQLite pool construction for the `pages` table.
//!
//! The `pages` table itself belongs to the hosting CMS; this crate only
//! opens a pool against the database file it lives in.

use crate::config::DatabaseConfig;
use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::time::Duration;
use tracing::debug;

/// Open a connection pool against the configured database file.
///
/// The database is created if missing so that a fresh deployment can be
/// pointed at an empty file. WAL journaling and a busy timeout keep
/// concurrent readers from tripping over transient locks.
///
/// # Errors
///
/// Returns [`crate::Error::Database`] when the file cannot be opened or the
/// pool cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool> {
    let opts = SqliteConnectOptions::new()
        .filename(&config.path)
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(config.busy_timeout_secs));

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(opts)
        .await?;

    debug!(path = %config.path.display(), "opened pages database");
    Ok(pool)
}

/// Open a single-connection in-memory pool.
///
/// Every new connection to an in-memory SQLite database sees its own empty
/// database, so the pool is capped at one connection.
///
/// # Errors
///
/// Returns [`crate::Error::Database`] when the pool cannot be established.
pub async fn connect_in_memory() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    Ok(pool)
}
