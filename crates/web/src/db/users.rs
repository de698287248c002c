//! User repository for account storage.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use heating_oil_tracker_core::{Email, Role, UserId};

use super::RepositoryError;
use crate::models::{NewUser, User};

const USER_COLUMNS: &str = "id, name, email, role, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct UserWithHashRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let role = row
            .role
            .parse::<Role>()
            .map_err(RepositoryError::DataCorruption)?;

        Ok(Self {
            id: UserId::new(row.id),
            name: row.name,
            email,
            role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Whether an account with this email exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, email: &Email) -> Result<bool, RepositoryError> {
        let found: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE email = ?")
            .bind(email.as_str())
            .fetch_optional(self.pool)
            .await?;

        Ok(found.is_some())
    }

    /// Insert a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, new_user: &NewUser<'_>) -> Result<User, RepositoryError> {
        let now = Utc::now();

        let row: UserRow = sqlx::query_as(&format!(
            r"
            INSERT INTO users (name, email, password_hash, role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(new_user.name)
        .bind(new_user.email.as_str())
        .bind(new_user.password_hash)
        .bind(new_user.role.as_str())
        .bind(now)
        .bind(now)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "user"))?;

        row.try_into()
    }

    /// Get a user and their password hash by email.
    ///
    /// Returns `None` if no account uses this email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row: Option<UserWithHashRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = ?"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| Ok((User::try_from(r.user)?, r.password_hash)))
            .transpose()
    }

    /// All users, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let rows: Vec<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(User::try_from).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::test_support;

    fn email(s: &str) -> Email {
        Email::parse(s).unwrap()
    }

    fn new_user<'a>(name: &'a str, email: &'a Email) -> NewUser<'a> {
        NewUser {
            name,
            email,
            password_hash: "$argon2id$stub",
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let pool = test_support::pool().await;
        let repo = UserRepository::new(&pool);
        let address = email("jo@tracker.test");

        assert!(!repo.exists(&address).await.unwrap());
        assert!(repo.get_with_password_hash(&address).await.unwrap().is_none());

        let user = repo.create(&new_user("Jo", &address)).await.unwrap();
        assert_eq!(user.name, "Jo");
        assert_eq!(user.role, Role::User);

        assert!(repo.exists(&address).await.unwrap());
        let (found, hash) = repo.get_with_password_hash(&address).await.unwrap().unwrap();
        assert_eq!(found, user);
        assert_eq!(hash, "$argon2id$stub");
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let pool = test_support::pool().await;
        let repo = UserRepository::new(&pool);
        let address = email("twice@tracker.test");

        repo.create(&new_user("One", &address)).await.unwrap();
        let err = repo.create(&new_user("Two", &address)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)), "{err}");
    }

    #[tokio::test]
    async fn test_unknown_role_is_data_corruption() {
        let pool = test_support::pool().await;
        sqlx::query("PRAGMA ignore_check_constraints = ON")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO users (name, email, password_hash, role, created_at, updated_at)
             VALUES ('X', 'x@tracker.test', 'h', 'root', '2026-01-01T00:00:00Z', '2026-01-01T00:00:00Z')",
        )
        .execute(&pool)
        .await
        .unwrap();

        let err = UserRepository::new(&pool).list().await.unwrap_err();
        assert!(matches!(err, RepositoryError::DataCorruption(_)), "{err}");
    }
}
