//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                  - Home page with waitlist form
//! POST /join-waitlist     - Waitlist submission
//!
//! # Auth
//! GET  /auth/sign-up      - Sign-up page
//! POST /auth/sign-up      - Sign-up action
//! GET  /auth/sign-in      - Sign-in page
//! POST /auth/sign-in      - Sign-in action
//! POST /auth/sign-out     - Sign-out action
//!
//! # Signed in
//! GET  /dashboard         - User dashboard
//! GET  /admin             - Lead list (admin email only)
//!
//! # Operations
//! GET  /health            - Liveness
//! GET  /health/ready      - Readiness (database reachable)
//! ```

pub mod admin;
pub mod auth;
pub mod dashboard;
pub mod health;
pub mod home;
pub mod page;
pub mod waitlist;

use axum::{
    Router,
    http::Uri,
    routing::{get, post},
};

use crate::error::AppError;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/sign-up", get(auth::sign_up_page).post(auth::sign_up))
        .route("/sign-in", get(auth::sign_in_page).post(auth::sign_in))
        .route("/sign-out", post(auth::sign_out))
}

/// Create the main router with all page routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/join-waitlist", post(waitlist::join_waitlist))
        .nest("/auth", auth_routes())
        .route("/dashboard", get(dashboard::dashboard))
        .route("/admin", get(admin::admin))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
}

/// Fallback for unknown paths.
pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_owned())
}
