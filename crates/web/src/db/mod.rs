//! Database operations for the tracker's `SQLite` store.
//!
//! ## Tables
//!
//! - `leads` - Waitlist sign-ups
//! - `users` - Site accounts
//! - `tower_sessions` - Session records, owned by the session store
//!
//! # Migrations
//!
//! Migrations live in `crates/web/migrations/` and are embedded in the binary.
//! The server applies them on startup; they can also be run explicitly:
//! ```bash
//! cargo run -p heating-oil-tracker-cli -- migrate
//! ```

pub mod leads;
pub mod users;

use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::migrate::MigrateError;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use thiserror::Error;

pub use leads::LeadRepository;
pub use users::UserRepository;

/// Path that selects a private in-memory database.
pub const IN_MEMORY: &str = ":memory:";

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a unique-constraint violation to `Conflict`, anything else to `Database`.
    fn from_insert(err: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(format!("{what} already exists"));
        }
        Self::Database(err)
    }
}

/// Create a `SQLite` connection pool.
///
/// A file path is created if missing and opened in WAL mode. [`IN_MEMORY`]
/// yields a single long-lived connection, since every new in-memory
/// connection would otherwise see its own empty database.
///
/// # Errors
///
/// Returns `sqlx::Error` if the database cannot be opened.
pub async fn create_pool(database_path: &str) -> Result<SqlitePool, sqlx::Error> {
    if database_path == IN_MEMORY {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        return SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await;
    }

    let options = SqliteConnectOptions::new()
        .filename(database_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5))
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}

/// Apply the embedded `leads`/`users` migrations.
///
/// # Errors
///
/// Returns `MigrateError` if a migration fails or the applied history diverges.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod test_support {
    use sqlx::SqlitePool;

    /// A migrated in-memory database.
    pub async fn pool() -> SqlitePool {
        let pool = super::create_pool(super::IN_MEMORY).await.unwrap();
        super::run_migrations(&pool).await.unwrap();
        pool
    }
}
