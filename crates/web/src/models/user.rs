//! User domain types.
//!
//! The password hash never leaves [`crate::db::users`] inside a `User`; only
//! the login path reads it, alongside the user.

use chrono::{DateTime, Utc};

use heating_oil_tracker_core::{Email, Role, UserId};

/// A site account (domain type).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name given at sign-up.
    pub name: String,
    /// Normalised email address.
    pub email: Email,
    /// Account role (always `user` for sign-ups).
    pub role: Role,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data needed to insert a user.
#[derive(Debug)]
pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a Email,
    pub password_hash: &'a str,
    pub role: Role,
}
