//! Listing commands for leads and users.
//!
//! Output is tab-separated, one record per line, newest lead first and users
//! in registration order.

use std::io::Write;

use heating_oil_tracker_web::db::{LeadRepository, UserRepository};
use heating_oil_tracker_web::models::{Lead, User};

use super::{CommandError, connect};

/// Print every lead.
///
/// # Errors
///
/// Returns an error if the database cannot be read or output fails.
pub async fn leads(out: &mut impl Write) -> Result<(), CommandError> {
    let pool = connect().await?;
    let leads = LeadRepository::new(&pool).list().await?;
    write_leads(out, &leads)?;
    tracing::info!(count = leads.len(), "Listed leads");
    Ok(())
}

/// Print every user.
///
/// # Errors
///
/// Returns an error if the database cannot be read or output fails.
pub async fn users(out: &mut impl Write) -> Result<(), CommandError> {
    let pool = connect().await?;
    let users = UserRepository::new(&pool).list().await?;
    write_users(out, &users)?;
    tracing::info!(count = users.len(), "Listed users");
    Ok(())
}

fn write_leads(out: &mut impl Write, leads: &[Lead]) -> std::io::Result<()> {
    writeln!(out, "id\temail\tcreated_at")?;
    for lead in leads {
        writeln!(
            out,
            "{}\t{}\t{}",
            lead.id,
            lead.email,
            lead.created_at.to_rfc3339()
        )?;
    }
    Ok(())
}

fn write_users(out: &mut impl Write, users: &[User]) -> std::io::Result<()> {
    writeln!(out, "id\tname\temail\trole\tcreated_at")?;
    for user in users {
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}",
            user.id,
            user.name,
            user.email,
            user.role,
            user.created_at.to_rfc3339()
        )?;
    }
    Ok(())
}
