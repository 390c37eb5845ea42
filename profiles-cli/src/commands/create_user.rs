//! createuser command - create a regular account

use anyhow::Result;
use colored::Colorize;
use profiles_core::{AuditEvent, ExtraFields, UserSummary};

use super::{get_context, get_logger, is_interactive, log_event, print_json, prompt_new_password};

pub struct CreateUserArgs {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
    pub no_password: bool,
    pub staff: bool,
    pub json: bool,
}

pub fn run(args: CreateUserArgs) -> Result<()> {
    let logger = get_logger();
    let ctx = get_context()?;

    let mut extra = ExtraFields::new();
    if let Some(first) = args.first_name {
        extra.insert("first_name", first);
    }
    if let Some(last) = args.last_name {
        extra.insert("last_name", last);
    }
    if args.staff {
        extra.insert("is_staff", true);
    }

    let password = match args.password {
        Some(p) => Some(p),
        None if args.no_password || args.json || !is_interactive() => None,
        None => prompt_new_password("Password (blank for none)")?,
    };

    let result = ctx
        .account_factory
        .create_user(Some(args.email.as_str()), password.as_deref(), extra);

    match &result {
        Ok(user) => log_event(
            &logger,
            AuditEvent::new("user_created").with_command("createuser").with_user(user.id),
        ),
        Err(e) => log_event(
            &logger,
            AuditEvent::new("user_create_failed").with_command("createuser").with_error(e),
        ),
    }

    if args.json {
        return print_json(result.map(|user| UserSummary::from(&user)));
    }

    let user = result?;
    println!("\n{} Created user {}", "✓".green(), user.email.to_string().bold());
    println!("  {} {}", "ID:".dimmed(), user.id);
    if password.is_none() {
        println!("  {}", "No usable password set".dimmed());
    }
    println!();
    Ok(())
}
