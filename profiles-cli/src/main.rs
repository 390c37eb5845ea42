//! Profiles CLI - manage email-identity accounts from the terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{
    audit, change_password, create_superuser, create_user, deactivate, delete, list, show,
};

/// Environment variable holding the tracing filter
const LOG_ENV_VAR: &str = "PROFILES_LOG";

/// Profiles - email-identity account records
#[derive(Parser)]
#[command(name = "profiles", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a regular account
    #[command(name = "createuser")]
    CreateUser {
        /// Email address (the login identifier)
        email: String,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        /// Password (prompted for when omitted in a terminal)
        #[arg(long, conflicts_with = "no_password")]
        password: Option<String>,
        /// Create the account without a usable password
        #[arg(long)]
        no_password: bool,
        /// Grant staff status
        #[arg(long)]
        staff: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create an account with staff and superuser status
    #[command(name = "createsuperuser")]
    CreateSuperuser {
        /// Email address (prompted for when omitted)
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        /// Do not prompt; the password comes from PROFILES_SUPERUSER_PASSWORD
        #[arg(long)]
        noinput: bool,
        /// Output as JSON (implies --noinput)
        #[arg(long)]
        json: bool,
    },

    /// Change an account's password
    #[command(name = "changepassword")]
    ChangePassword {
        email: String,
        /// New password (prompted for when omitted in a terminal)
        #[arg(long, conflicts_with = "unusable")]
        password: Option<String>,
        /// Make the password unusable
        #[arg(long)]
        unusable: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List all accounts
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one account
    Show {
        email: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Mark an account inactive
    Deactivate {
        email: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete an account
    Delete {
        email: String,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// View and manage the audit log
    Audit {
        #[command(subcommand)]
        command: audit::AuditCommands,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
    {
        eprintln!("tracing init failed: {}", e);
    }
}

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("Error: {:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::CreateUser {
            email,
            first_name,
            last_name,
            password,
            no_password,
            staff,
            json,
        } => create_user::run(create_user::CreateUserArgs {
            email,
            first_name,
            last_name,
            password,
            no_password,
            staff,
            json,
        }),
        Commands::CreateSuperuser {
            email,
            first_name,
            last_name,
            noinput,
            json,
        } => create_superuser::run(create_superuser::CreateSuperuserArgs {
            email,
            first_name,
            last_name,
            noinput,
            json,
        }),
        Commands::ChangePassword {
            email,
            password,
            unusable,
            json,
        } => change_password::run(&email, password, unusable, json),
        Commands::List { json } => list::run(json),
        Commands::Show { email, json } => show::run(&email, json),
        Commands::Deactivate { email, json } => deactivate::run(&email, json),
        Commands::Delete { email, force, json } => delete::run(&email, force, json),
        Commands::Audit { command } => audit::run(command),
    }
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
    fn test_parse_createsuperuser_noinput() {
        let cli = Cli::try_parse_from([
            "profiles",
            "createsuperuser",
            "--email",
            "admin@example.com",
            "--noinput",
        ])
        .unwrap();
        match cli.command {
            Commands::CreateSuperuser { email, noinput, .. } => {
                assert_eq!(email.as_deref(), Some("admin@example.com"));
                assert!(noinput);
            }
            _ => panic!("expected createsuperuser"),
        }
    }

    #[test]
    fn test_password_conflicts_with_no_password() {
        assert!(Cli::try_parse_from([
            "profiles",
            "createuser",
            "a@b.com",
            "--password",
            "x",
            "--no-password",
        ])
        .is_err());
    }
}
