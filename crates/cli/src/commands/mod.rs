//! CLI command implementations.

pub mod list;
pub mod migrate;

use heating_oil_tracker_web::config::DB_PATH_VAR;
use heating_oil_tracker_web::db;
use sqlx::SqlitePool;
use thiserror::Error;

/// Errors shared by the CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Stored records could not be read.
    #[error("Repository error: {0}")]
    Repository(#[from] db::RepositoryError),

    /// Writing output failed.
    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}

/// Open the database named by `HEATING_OIL_TRACKER_DB_PATH`.
async fn connect() -> Result<SqlitePool, CommandError> {
    dotenvy::dotenv().ok();

    let path = std::env::var(DB_PATH_VAR)
        .ok()
        .filter(|p| !p.is_empty())
        .ok_or(CommandError::MissingEnvVar(DB_PATH_VAR))?;

    tracing::info!(%path, "Connecting to database...");
    Ok(db::create_pool(&path).await?)
}
