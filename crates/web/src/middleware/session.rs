//! Session middleware configuration.
//!
//! Session data lives in the `tower_sessions` table of the site database. The
//! browser only receives the session ID, encrypted with a key derived from the
//! configured cookie secret.

use std::time::Duration as StdDuration;

use secrecy::ExposeSecret;
use sha2::{Digest, Sha512};
use sqlx::SqlitePool;
use tokio::task::JoinHandle;
use tower_sessions::cookie::{Key, SameSite, time::Duration};
use tower_sessions::service::PrivateCookie;
use tower_sessions::{ExpiredDeletion, Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;

use crate::config::AppConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "hot_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// How often expired session rows are purged.
const CLEANUP_INTERVAL: StdDuration = StdDuration::from_secs(60);

/// Create the `SQLite` session store and its table.
///
/// # Errors
///
/// Returns `sqlx::Error` if the session table cannot be created.
pub async fn create_session_store(pool: &SqlitePool) -> Result<SqliteStore, sqlx::Error> {
    let store = SqliteStore::new(pool.clone());
    store.migrate().await?;
    Ok(store)
}

/// Create the session layer.
///
/// Sessions expire after seven days without a request. The cookie is
/// HTTP-only, `SameSite=Lax`, and `Secure` when the base URL is HTTPS.
#[must_use]
pub fn create_session_layer(
    store: SqliteStore,
    config: &AppConfig,
) -> SessionManagerLayer<SqliteStore, PrivateCookie> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::seconds(
            SESSION_EXPIRY_SECONDS,
        )))
        .with_secure(config.secure_cookies())
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_private(cookie_key(config))
}

/// Purge expired sessions in the background until the task is aborted.
pub fn spawn_expired_session_cleanup(store: SqliteStore) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = store.continuously_delete_expired(CLEANUP_INTERVAL).await {
            tracing::error!(error = %e, "Expired session cleanup stopped");
        }
    })
}

/// Derive the 64-byte cookie encryption key from the configured secret.
pub(crate) fn cookie_key(config: &AppConfig) -> Key {
    let digest = Sha512::digest(config.cookie_secret.expose_secret().as_bytes());
    Key::from(digest.as_slice())
}
