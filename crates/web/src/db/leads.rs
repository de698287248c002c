//! Lead repository for waitlist sign-ups.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use heating_oil_tracker_core::{Email, LeadId};

use super::RepositoryError;
use crate::models::Lead;

#[derive(sqlx::FromRow)]
struct LeadRow {
    id: i64,
    email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<LeadRow> for Lead {
    type Error = RepositoryError;

    fn try_from(row: LeadRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: LeadId::new(row.id),
            email,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for lead database operations.
pub struct LeadRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> LeadRepository<'a> {
    /// Create a new lead repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Whether a lead with this email is already on the waitlist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, email: &Email) -> Result<bool, RepositoryError> {
        let found: Option<(i64,)> = sqlx::query_as("SELECT id FROM leads WHERE email = ?")
            .bind(email.as_str())
            .fetch_optional(self.pool)
            .await?;

        Ok(found.is_some())
    }

    /// Add an email to the waitlist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already on the waitlist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, email: &Email) -> Result<Lead, RepositoryError> {
        let now = Utc::now();

        let row: LeadRow = sqlx::query_as(
            r"
            INSERT INTO leads (email, created_at, updated_at)
            VALUES (?, ?, ?)
            RETURNING id, email, created_at, updated_at
            ",
        )
        .bind(email.as_str())
        .bind(now)
        .bind(now)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "lead"))?;

        row.try_into()
    }

    /// All leads, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored email is invalid.
    pub async fn list(&self) -> Result<Vec<Lead>, RepositoryError> {
        let rows: Vec<LeadRow> = sqlx::query_as(
            r"
            SELECT id, email, created_at, updated_at
            FROM leads
            ORDER BY created_at DESC, id DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Lead::try_from).collect()
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

    #[tokio::test]
    async fn test_create_and_exists() {
        let pool = test_support::pool().await;
        let repo = LeadRepository::new(&pool);

        assert!(!repo.exists(&email("first@tracker.test")).await.unwrap());

        let lead = repo.create(&email("first@tracker.test")).await.unwrap();
        assert_eq!(lead.email.as_str(), "first@tracker.test");
        assert_eq!(lead.created_at, lead.updated_at);

        assert!(repo.exists(&email("FIRST@tracker.test")).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_conflict() {
        let pool = test_support::pool().await;
        let repo = LeadRepository::new(&pool);

        repo.create(&email("dup@tracker.test")).await.unwrap();
        let err = repo.create(&email("dup@tracker.test")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)), "{err}");
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let pool = test_support::pool().await;
        let repo = LeadRepository::new(&pool);

        for address in ["a@tracker.test", "b@tracker.test", "c@tracker.test"] {
            repo.create(&email(address)).await.unwrap();
        }

        let emails: Vec<String> = repo
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|lead| lead.email.into_inner())
            .collect();
        assert_eq!(
            emails,
            ["c@tracker.test", "b@tracker.test", "a@tracker.test"]
        );
    }
}
