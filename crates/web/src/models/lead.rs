//! Waitlist lead domain type.

use chrono::{DateTime, Utc};

use heating_oil_tracker_core::{Email, LeadId};

/// A prospective customer who joined the waitlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lead {
    pub id: LeadId,
    pub email: Email,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
