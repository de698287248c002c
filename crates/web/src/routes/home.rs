//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;

use super::page::{FormState, PageContext};
use crate::filters;
use crate::middleware::MaybeUser;
use crate::state::AppState;

/// Landing page with the waitlist form.
///
/// Also rendered after waitlist submissions, sign-up, sign-in and sign-out.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct HomeTemplate {
    pub page: PageContext,
    pub form: FormState,
    /// One-line banner above the hero (e.g. after sign-up).
    pub notice: Option<&'static str>,
}

impl HomeTemplate {
    #[must_use]
    pub fn new(page: PageContext) -> Self {
        Self {
            page,
            form: FormState::new(),
            notice: None,
        }
    }

    #[must_use]
    pub fn with_form(mut self, form: FormState) -> Self {
        self.form = form;
        self
    }

    #[must_use]
    pub const fn with_notice(mut self, notice: &'static str) -> Self {
        self.notice = Some(notice);
        self
    }
}

/// Display the home page.
pub async fn home(State(state): State<AppState>, MaybeUser(user): MaybeUser) -> HomeTemplate {
    HomeTemplate::new(PageContext::new(&state, user))
}
