//! Authentication extractors.
//!
//! Handlers declare the access they need through their arguments:
//!
//! ```rust,ignore
//! async fn dashboard(RequireUser(user): RequireUser) -> impl IntoResponse { /* ... */ }
//! async fn admin(RequireAdmin(user): RequireAdmin) -> impl IntoResponse { /* ... */ }
//! async fn home(MaybeUser(user): MaybeUser) -> impl IntoResponse { /* ... */ }
//! ```
//!
//! Anonymous visitors and signed-in non-admins hitting a gated page are sent
//! to `/` with `302 Found`.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, header::LOCATION, request::Parts},
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;

/// Where gated pages send visitors who may not see them.
const HOME: &str = "/";

/// Extractor that optionally gets the signed-in user.
///
/// A session that exists but cannot be decoded is flushed and reported as an
/// error rather than silently treated as signed out.
pub struct MaybeUser(pub Option<CurrentUser>);

/// Extractor that requires a signed-in user.
pub struct RequireUser(pub CurrentUser);

/// Extractor that requires the signed-in user to be the configured admin.
pub struct RequireAdmin(pub CurrentUser);

/// Rejection for the gated extractors.
#[derive(Debug)]
pub enum AuthRejection {
    /// Not allowed here: `302 Found` to the home page.
    RedirectHome,
    /// The session could not be read.
    Failed(AppError),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectHome => (StatusCode::FOUND, [(LOCATION, HOME)]).into_response(),
            Self::Failed(err) => err.into_response(),
        }
    }
}

impl From<AppError> for AuthRejection {
    fn from(err: AppError) -> Self {
        Self::Failed(err)
    }
}

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by SessionManagerLayer
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer not installed".to_string()))?;

        match session.get::<CurrentUser>(session_keys::CURRENT_USER).await {
            Ok(user) => Ok(Self(user)),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable session");
                if let Err(flush_err) = session.flush().await {
                    tracing::error!(error = %flush_err, "Failed to flush unreadable session");
                }
                Err(AppError::Session(e))
            }
        }
    }
}

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let MaybeUser(user) = MaybeUser::from_request_parts(parts, state).await?;
        user.map(Self).ok_or(AuthRejection::RedirectHome)
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireUser(user) = RequireUser::from_request_parts(parts, state).await?;

        if !state.config().is_admin(&user.email) {
            tracing::info!(user_id = %user.id, "Non-admin denied admin page");
            return Err(AuthRejection::RedirectHome);
        }

        Ok(Self(user))
    }
}

/// Store the signed-in user in the session.
///
/// The session ID is rotated first so an ID issued before sign-in cannot be
/// reused to ride the authenticated session.
///
/// # Errors
///
/// Returns an error if the session store cannot be written.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Sign out: delete the session record and expire the cookie.
///
/// # Errors
///
/// Returns an error if the session store cannot be written.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
