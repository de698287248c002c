//! Shared page data: layout context and form state.

use std::collections::HashMap;

use crate::models::CurrentUser;
use crate::state::AppState;

// =============================================================================
// Messages
// =============================================================================

pub const INVALID_EMAIL: &str = "Oops! That email address appears to be invalid";
pub const ALREADY_SUBSCRIBED: &str = "Oops! It appears you are already subscribed";
pub const ALREADY_REGISTERED: &str = "Oops! It appears you are already registered";
pub const GENERIC_ERROR: &str = "Oops! It appears we have had an error";
pub const INCORRECT_CREDENTIALS: &str = "Oops! Email address or password is incorrect.";
pub const JOINED_WAITLIST: &str = "Thanks! You are on the list. We will be in touch when we launch.";

// =============================================================================
// Layout Context
// =============================================================================

/// What the layout needs to draw the navigation.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    /// The signed-in user, if any.
    pub user: Option<CurrentUser>,
    /// Whether to show the admin link.
    pub is_admin: bool,
}

impl PageContext {
    #[must_use]
    pub fn new(state: &AppState, user: Option<CurrentUser>) -> Self {
        let is_admin = user
            .as_ref()
            .is_some_and(|u| state.config().is_admin(&u.email));
        Self { user, is_admin }
    }

    /// Layout context for a visitor who is not signed in.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }
}

// =============================================================================
// Form State
// =============================================================================

/// Submitted values and per-field errors, for re-rendering a form.
///
/// Passwords are never stored here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    values: HashMap<&'static str, String>,
    errors: HashMap<&'static str, &'static str>,
}

impl FormState {
    /// An empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Echo a submitted value back into the form.
    #[must_use]
    pub fn with_value(mut self, field: &'static str, value: &str) -> Self {
        self.values.insert(field, value.to_owned());
        self
    }

    /// Attach an error message to a field.
    #[must_use]
    pub fn with_error(mut self, field: &'static str, message: &'static str) -> Self {
        self.errors.insert(field, message);
        self
    }

    /// The echoed value for `field`, or an empty string.
    #[must_use]
    pub fn value(&self, field: &str) -> &str {
        self.values.get(field).map_or("", String::as_str)
    }

    /// The error message for `field`, if any.
    #[must_use]
    pub fn error(&self, field: &str) -> Option<&'static str> {
        self.errors.get(field).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_form() {
        let form = FormState::new();
        assert_eq!(form.value("email"), "");
        assert_eq!(form.error("email"), None);
    }

    #[test]
    fn test_echo_and_error() {
        let form = FormState::new()
            .with_value("email", "bad@")
            .with_error("email", INVALID_EMAIL);

        assert_eq!(form.value("email"), "bad@");
        assert_eq!(form.error("email"), Some(INVALID_EMAIL));
        assert_eq!(form.error("name"), None);
    }

    #[test]
    fn test_anonymous_context() {
        let page = PageContext::anonymous();
        assert!(page.user.is_none());
        assert!(!page.is_admin);
    }
}
