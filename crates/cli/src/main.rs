//! Heating Oil Tracker CLI - database migrations and listings.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! hot-cli migrate
//!
//! # Print every waitlist lead
//! hot-cli leads list
//!
//! # Print every registered user
//! hot-cli users list
//! ```
//!
//! The database is taken from `HEATING_OIL_TRACKER_DB_PATH` (a `.env` file is
//! honoured).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "hot-cli")]
#[command(author, version, about = "Heating Oil Tracker CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Inspect waitlist leads
    Leads {
        #[command(subcommand)]
        action: ListAction,
    },
    /// Inspect registered users
    Users {
        #[command(subcommand)]
        action: ListAction,
    },
}

#[derive(Subcommand)]
enum ListAction {
    /// Print all records
    List,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Leads {
            action: ListAction::List,
        } => commands::list::leads(&mut std::io::stdout().lock()).await?,
        Commands::Users {
            action: ListAction::List,
        } => commands::list::users(&mut std::io::stdout().lock()).await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_subcommands() {
        let cli = Cli::try_parse_from(["hot-cli", "leads", "list"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Leads {
                action: ListAction::List
            })
        ));

        let cli = Cli::try_parse_from(["hot-cli", "migrate"]);
        assert!(matches!(cli.map(|c| c.command), Ok(Commands::Migrate)));

        assert!(Cli::try_parse_from(["hot-cli", "users"]).is_err());
    }
}
