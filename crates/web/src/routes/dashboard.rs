//! Dashboard route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;

use super::page::PageContext;
use crate::filters;
use crate::middleware::RequireUser;
use crate::models::CurrentUser;
use crate::state::AppState;

/// Dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub page: PageContext,
    pub user: CurrentUser,
}

/// Display the signed-in user's dashboard.
pub async fn dashboard(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> DashboardTemplate {
    DashboardTemplate {
        page: PageContext::new(&state, Some(user.clone())),
        user,
    }
}
