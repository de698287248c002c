//! Waitlist sign-up route handler.

use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use heating_oil_tracker_core::Email;

use super::home::HomeTemplate;
use super::page::{
    ALREADY_SUBSCRIBED, FormState, GENERIC_ERROR, INVALID_EMAIL, JOINED_WAITLIST, PageContext,
};
use crate::db::{LeadRepository, RepositoryError};
use crate::middleware::MaybeUser;
use crate::state::AppState;

/// Waitlist form data.
#[derive(Debug, Deserialize)]
pub struct WaitlistForm {
    #[serde(default)]
    pub email: String,
}

/// Handle a waitlist submission.
///
/// - Invalid email: 422, email echoed
/// - Already on the waitlist: 422, email echoed
/// - Database failure: 500, generic message
/// - Otherwise the lead is stored and the confirmation shown above an empty form
#[instrument(skip_all, fields(email = %form.email))]
pub async fn join_waitlist(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Form(form): Form<WaitlistForm>,
) -> Response {
    let page = PageContext::new(&state, user);
    let rejected = |message| {
        FormState::new()
            .with_value("email", &form.email)
            .with_error("email", message)
    };

    let Ok(email) = Email::parse(&form.email) else {
        tracing::debug!("Rejected invalid waitlist email");
        return render(page, StatusCode::UNPROCESSABLE_ENTITY, rejected(INVALID_EMAIL));
    };

    let leads = LeadRepository::new(state.pool());

    match leads.exists(&email).await {
        Ok(false) => {}
        Ok(true) => {
            return render(
                page,
                StatusCode::UNPROCESSABLE_ENTITY,
                rejected(ALREADY_SUBSCRIBED),
            );
        }
        Err(e) => return database_failure(page, &e),
    }

    match leads.create(&email).await {
        Ok(lead) => {
            tracing::info!(lead_id = %lead.id, "Lead joined waitlist");
            HomeTemplate::new(page)
                .with_notice(JOINED_WAITLIST)
                .into_response()
        }
        // Lost a race with a concurrent submission of the same address
        Err(RepositoryError::Conflict(_)) => render(
            page,
            StatusCode::UNPROCESSABLE_ENTITY,
            rejected(ALREADY_SUBSCRIBED),
        ),
        Err(e) => database_failure(page, &e),
    }
}

fn render(page: PageContext, status: StatusCode, form: FormState) -> Response {
    (status, HomeTemplate::new(page).with_form(form)).into_response()
}

fn database_failure(page: PageContext, err: &RepositoryError) -> Response {
    tracing::error!(error = %err, "Failed to save waitlist lead");
    render(
        page,
        StatusCode::INTERNAL_SERVER_ERROR,
        FormState::new().with_error("email", GENERIC_ERROR),
    )
}
