//! Database migration command.
//!
//! ```bash
//! hot-cli migrate
//! ```
//!
//! Migrations are embedded from `crates/web/migrations/`. The server also
//! applies them on startup, so this is only needed to prepare a database
//! ahead of a deploy.

use super::{CommandError, connect};
use heating_oil_tracker_web::db;

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    db::run_migrations(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
