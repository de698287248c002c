//! Domain models.
//!
//! These are validated types, separate from the database row types in [`crate::db`].

pub mod lead;
pub mod session;
pub mod user;

pub use lead::Lead;
pub use session::{CurrentUser, keys as session_keys};
pub use user::{NewUser, User};
