//! Authentication route handlers.
//!
//! Sign-up, sign-in and sign-out with email and password. Sign-up does not
//! sign the new account in.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::home::HomeTemplate;
use super::page::{
    ALREADY_REGISTERED, FormState, GENERIC_ERROR, INCORRECT_CREDENTIALS, INVALID_EMAIL,
    PageContext,
};
use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{MaybeUser, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Sign-up form data.
#[derive(Debug, Deserialize)]
pub struct SignUpForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Sign-in form data.
#[derive(Debug, Deserialize)]
pub struct SignInForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Sign-up page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/sign_up.html")]
pub struct SignUpTemplate {
    pub page: PageContext,
    pub form: FormState,
}

/// Sign-in page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/sign_in.html")]
pub struct SignInTemplate {
    pub page: PageContext,
    pub form: FormState,
}

// =============================================================================
// Sign-up Routes
// =============================================================================

/// Display the sign-up page.
pub async fn sign_up_page(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> SignUpTemplate {
    SignUpTemplate {
        page: PageContext::new(&state, user),
        form: FormState::new(),
    }
}

/// Handle sign-up form submission.
#[instrument(skip_all, fields(email = %form.email))]
pub async fn sign_up(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Form(form): Form<SignUpForm>,
) -> Response {
    let page = PageContext::new(&state, user);
    let auth = AuthService::new(state.pool());

    let result = auth
        .register_with_password(&form.name, &form.email, &form.password)
        .await;

    let (status, message) = match result {
        Ok(_) => {
            return HomeTemplate::new(page)
                .with_notice("Thanks for signing up! You can now sign in.")
                .into_response();
        }
        Err(AuthError::InvalidEmail(_)) => (StatusCode::UNPROCESSABLE_ENTITY, INVALID_EMAIL),
        Err(AuthError::UserAlreadyExists) => {
            (StatusCode::UNPROCESSABLE_ENTITY, ALREADY_REGISTERED)
        }
        Err(e) => {
            tracing::error!(error = %e, "Sign-up failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                SignUpTemplate {
                    page,
                    form: FormState::new().with_error("email", GENERIC_ERROR),
                },
            )
                .into_response();
        }
    };

    let form = FormState::new()
        .with_value("name", &form.name)
        .with_value("email", &form.email)
        .with_error("email", message);

    (status, SignUpTemplate { page, form }).into_response()
}

// =============================================================================
// Sign-in Routes
// =============================================================================

/// Display the sign-in page.
pub async fn sign_in_page(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> SignInTemplate {
    SignInTemplate {
        page: PageContext::new(&state, user),
        form: FormState::new(),
    }
}

/// Handle sign-in form submission.
///
/// Unknown email and wrong password produce the same response.
#[instrument(skip_all, fields(email = %form.email))]
pub async fn sign_in(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    session: Session,
    Form(form): Form<SignInForm>,
) -> Result<Response> {
    let auth = AuthService::new(state.pool());

    let message = match auth.login_with_password(&form.email, &form.password).await {
        Ok(account) => {
            let current = CurrentUser::from(&account);
            set_current_user(&session, &current).await?;
            set_sentry_user(&current.id, Some(current.email.as_str()));
            tracing::info!(user_id = %current.id, "User signed in");

            let page = PageContext::new(&state, Some(current));
            return Ok(HomeTemplate::new(page).into_response());
        }
        Err(AuthError::InvalidEmail(_)) => INVALID_EMAIL,
        Err(AuthError::InvalidCredentials) => {
            tracing::info!("Sign-in rejected");
            INCORRECT_CREDENTIALS
        }
        Err(e) => {
            tracing::error!(error = %e, "Sign-in failed");
            let form = FormState::new()
                .with_value("email", &form.email)
                .with_error("email", GENERIC_ERROR);
            return Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                SignInTemplate {
                    page: PageContext::new(&state, user),
                    form,
                },
            )
                .into_response());
        }
    };

    let form = FormState::new()
        .with_value("email", &form.email)
        .with_error("email", message);

    Ok((
        StatusCode::UNPROCESSABLE_ENTITY,
        SignInTemplate {
            page: PageContext::new(&state, user),
            form,
        },
    )
        .into_response())
}

// =============================================================================
// Sign-out Route
// =============================================================================

/// Sign out and show the home page.
pub async fn sign_out(session: Session) -> Result<HomeTemplate> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    tracing::info!("User signed out");

    Ok(HomeTemplate::new(PageContext::anonymous()).with_notice("You have been signed out."))
}
