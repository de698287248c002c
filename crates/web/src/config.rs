//! Site configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `HEATING_OIL_TRACKER_COOKIE_STORE_SECRET` - Session cookie encryption secret (min 32 chars, high entropy)
//! - `HEATING_OIL_TRACKER_DB_PATH` - `SQLite` database file (`:memory:` for an ephemeral database)
//! - `HEATING_OIL_TRACKER_ADMIN_EMAIL` - Email of the account allowed to view `/admin`
//!
//! ## Optional
//! - `HEATING_OIL_TRACKER_HOST` - Bind address (default: 127.0.0.1)
//! - `HEATING_OIL_TRACKER_PORT` - Listen port (default: 8080)
//! - `HEATING_OIL_TRACKER_BASE_URL` - Public URL (default: <http://localhost:8080>)
//! - `HEATING_OIL_TRACKER_STATIC_DIR` - Static asset directory (default: crates/web/static)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `LOG_FORMAT` - `json` for JSON log lines, anything else for human-readable output

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use heating_oil_tracker_core::Email;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_COOKIE_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

pub const COOKIE_SECRET_VAR: &str = "HEATING_OIL_TRACKER_COOKIE_STORE_SECRET";
pub const DB_PATH_VAR: &str = "HEATING_OIL_TRACKER_DB_PATH";
pub const ADMIN_EMAIL_VAR: &str = "HEATING_OIL_TRACKER_ADMIN_EMAIL";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Site configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on (0 picks an ephemeral port)
    pub port: u16,
    /// Public base URL; `https://` marks the session cookie `Secure`
    pub base_url: String,
    /// `SQLite` database path
    pub database_path: String,
    /// Secret the session cookie encryption key is derived from
    pub cookie_secret: SecretString,
    /// Email of the admin account
    pub admin_email: Email,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    /// Emit JSON log lines instead of the human-readable format
    pub json_logs: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the cookie secret fails validation (length, placeholder, entropy).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Same as [`AppConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = get_env_or_default(&lookup, "HEATING_OIL_TRACKER_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("HEATING_OIL_TRACKER_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default(&lookup, "HEATING_OIL_TRACKER_PORT", "8080")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("HEATING_OIL_TRACKER_PORT".to_string(), e.to_string())
            })?;
        let base_url = get_env_or_default(
            &lookup,
            "HEATING_OIL_TRACKER_BASE_URL",
            "http://localhost:8080",
        );
        let database_path = get_required_env(&lookup, DB_PATH_VAR)?;

        let cookie_secret = get_validated_secret(&lookup, COOKIE_SECRET_VAR)?;
        validate_cookie_secret(&cookie_secret, COOKIE_SECRET_VAR)?;

        let admin_email = Email::parse(&get_required_env(&lookup, ADMIN_EMAIL_VAR)?)
            .map_err(|e| ConfigError::InvalidEnvVar(ADMIN_EMAIL_VAR.to_string(), e.to_string()))?;

        let static_dir = PathBuf::from(get_env_or_default(
            &lookup,
            "HEATING_OIL_TRACKER_STATIC_DIR",
            "crates/web/static",
        ));
        let json_logs = lookup("LOG_FORMAT").is_some_and(|v| v.eq_ignore_ascii_case("json"));

        Ok(Self {
            host,
            port,
            base_url,
            database_path,
            cookie_secret,
            admin_email,
            static_dir,
            json_logs,
            sentry_dsn: lookup("SENTRY_DSN").filter(|v| !v.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT").filter(|v| !v.is_empty()),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the session cookie should carry the `Secure` attribute.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    /// Whether `email` belongs to the configured admin.
    ///
    /// Both sides are normalised [`Email`]s, so the comparison ignores case.
    #[must_use]
    pub fn is_admin(&self, email: &Email) -> bool {
        &self.admin_email == email
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<String, ConfigError> {
    lookup(key)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> String {
    lookup(key).unwrap_or_else(|| default.to_string())
}

/// Validate that the cookie secret meets minimum length requirements.
fn validate_cookie_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_COOKIE_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_COOKIE_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret.
fn get_validated_secret(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<SecretString, ConfigError> {
    let value = get_required_env(lookup, key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
