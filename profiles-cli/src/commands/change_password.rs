//! changepassword command - replace an account's password

use anyhow::Result;
use colored::Colorize;
use profiles_core::{AuditEvent, UserSummary};

use super::{get_context, get_logger, is_interactive, log_event, print_json, prompt_new_password};

/// Prompts before giving up on mismatched confirmations
const MAX_PROMPT_ATTEMPTS: usize = 3;

pub fn run(email: &str, password: Option<String>, unusable: bool, json: bool) -> Result<()> {
    let logger = get_logger();
    let ctx = get_context()?;

    // Fail fast on unknown accounts before prompting
    let user = match ctx.directory_service.get_by_email(email) {
        Ok(user) => user,
        Err(e) if json => return print_json::<UserSummary>(Err(e)),
        Err(e) => return Err(e.into()),
    };

    let password = if unusable {
        None
    } else if let Some(p) = password {
        Some(p)
    } else if json || !is_interactive() {
        anyhow::bail!("Pass --password or --unusable when not running interactively");
    } else {
        println!("Changing password for user '{}'", user.email);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match prompt_new_password("Password") {
                Ok(Some(p)) => break Some(p),
                Ok(None) => eprintln!("{}", "Blank passwords aren't allowed.".red()),
                Err(e) => eprintln!("{}", e.to_string().red()),
            }
            if attempt >= MAX_PROMPT_ATTEMPTS {
                anyhow::bail!(
                    "Aborting password change for user '{}' after {} attempts",
                    user.email,
                    attempt
                );
            }
        }
    };

    let result = ctx
        .directory_service
        .change_password(email, password.as_deref());

    match &result {
        Ok(user) => log_event(
            &logger,
            AuditEvent::new("password_changed")
                .with_command("changepassword")
                .with_user(user.id),
        ),
        Err(e) => log_event(
            &logger,
            AuditEvent::new("password_change_failed")
                .with_command("changepassword")
                .with_user(user.id)
                .with_error(e),
        ),
    }

    if json {
        return print_json(result.map(|user| UserSummary::from(&user)));
    }

    let user = result?;
    if unusable {
        println!("\n{} Password for {} marked unusable\n", "✓".green(), user.email);
    } else {
        println!("\n{} Password changed successfully for user '{}'\n", "✓".green(), user.email);
    }
    Ok(())
}
