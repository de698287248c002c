//! Authentication service.
//!
//! Password sign-up and sign-in backed by Argon2id. Hashing and verification
//! are CPU-bound, so both run on the blocking thread pool.

mod error;

pub use error::AuthError;

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::SqlitePool;

use heating_oil_tracker_core::{Email, Role};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::{NewUser, User};

/// Hash checked when the email is unknown, so a miss costs as much as a wrong password.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("heating-oil-tracker-dummy").ok());

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new user with name, email and password.
    ///
    /// The account is created with [`Role::User`] and is not signed in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    /// Returns `AuthError::PasswordHash` if the password cannot be hashed.
    /// Returns `AuthError::Repository` for database failures.
    pub async fn register_with_password(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;

        if self.users.exists(&email).await? {
            return Err(AuthError::UserAlreadyExists);
        }

        let password = password.to_owned();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|_| AuthError::PasswordHash)??;

        let user = self
            .users
            .create(&NewUser {
                name: name.trim(),
                email: &email,
                password_hash: &password_hash,
                role: Role::User,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::InvalidCredentials` if the email is unknown or the password is wrong.
    /// Returns `AuthError::Repository` for database failures.
    pub async fn login_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;

        let found = self.users.get_with_password_hash(&email).await?;
        let (user, hash) = found.map_or((None, None), |(user, hash)| (Some(user), Some(hash)));

        let password = password.to_owned();
        let verified = tokio::task::spawn_blocking(move || {
            // Unknown users still pay for a full verification
            hash.or_else(|| DUMMY_HASH.clone())
                .is_some_and(|hash| verify_password(&password, &hash).is_ok())
        })
        .await
        .map_err(|_| AuthError::PasswordHash)?;

        match user {
            Some(user) if verified => Ok(user),
            _ => Err(AuthError::InvalidCredentials),
        }
    }
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::test_support;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash).is_ok());
        assert!(matches!(
            verify_password("battery staple", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hashes_are_salted() {
        assert_ne!(hash_password("same").unwrap(), hash_password("same").unwrap());
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_dummy_hash_is_available() {
        assert!(DUMMY_HASH.is_some());
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let pool = test_support::pool().await;
        let auth = AuthService::new(&pool);

        let user = auth
            .register_with_password("  Dana ", " Dana@Tracker.test", "hunter22")
            .await
            .unwrap();
        assert_eq!(user.name, "Dana");
        assert_eq!(user.email.as_str(), "dana@tracker.test");
        assert_eq!(user.role, Role::User);

        let logged_in = auth
            .login_with_password("DANA@tracker.test", "hunter22")
            .await
            .unwrap();
        assert_eq!(logged_in.id, user.id);
    }

    #[tokio::test]
    async fn test_register_duplicate() {
        let pool = test_support::pool().await;
        let auth = AuthService::new(&pool);

        auth.register_with_password("A", "a@tracker.test", "pw-one")
            .await
            .unwrap();
        let err = auth
            .register_with_password("B", "A@tracker.test", "pw-two")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserAlreadyExists));
    }

    #[tokio::test]
    async fn test_register_invalid_email() {
        let pool = test_support::pool().await;
        let err = AuthService::new(&pool)
            .register_with_password("A", "nope", "pw")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidEmail(_)));
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let pool = test_support::pool().await;
        let auth = AuthService::new(&pool);
        auth.register_with_password("C", "c@tracker.test", "right")
            .await
            .unwrap();

        let wrong_password = auth
            .login_with_password("c@tracker.test", "wrong")
            .await
            .unwrap_err();
        let unknown_user = auth
            .login_with_password("nobody@tracker.test", "right")
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_user, AuthError::InvalidCredentials));
    }
}
