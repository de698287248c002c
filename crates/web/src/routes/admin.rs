//! Admin route handler: the list of waitlist leads.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;

use super::page::PageContext;
use crate::db::LeadRepository;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::{CurrentUser, Lead};
use crate::state::AppState;

/// Admin page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin.html")]
pub struct AdminTemplate {
    pub page: PageContext,
    pub user: CurrentUser,
    pub leads: Vec<Lead>,
    /// The lead query failed; the page renders with an empty list.
    pub load_failed: bool,
}

/// Display all leads, newest first.
pub async fn admin(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
) -> AdminTemplate {
    let (leads, load_failed) = match LeadRepository::new(state.pool()).list().await {
        Ok(leads) => (leads, false),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load leads");
            (Vec::new(), true)
        }
    };

    AdminTemplate {
        page: PageContext::new(&state, Some(user.clone())),
        user,
        leads,
        load_failed,
    }
}
