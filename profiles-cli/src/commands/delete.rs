//! delete command - remove an account

use anyhow::Result;
use colored::Colorize;
use dialoguer::Confirm;
use profiles_core::AuditEvent;

use super::{get_context, get_logger, is_interactive, log_event, print_json};

pub fn run(email: &str, force: bool, json: bool) -> Result<()> {
    let logger = get_logger();
    let ctx = get_context()?;

    // Confirm deletion unless --force
    if !force && !json {
        if !is_interactive() {
            anyhow::bail!("Refusing to delete without confirmation; pass --force");
        }
        println!("\n{}", format!("This will permanently delete the user '{}'.", email.trim()).yellow());

        if !Confirm::new()
            .with_prompt("Are you sure?")
            .default(false)
            .interact()?
        {
            println!("{}\n", "Cancelled".dimmed());
            return Ok(());
        }
    }

    let result = ctx.directory_service.delete_by_email(email);

    match &result {
        Ok(id) => log_event(
            &logger,
            AuditEvent::new("user_deleted").with_command("delete").with_user(*id),
        ),
        Err(e) => log_event(
            &logger,
            AuditEvent::new("user_delete_failed").with_command("delete").with_error(e),
        ),
    }

    if json {
        return print_json(result.map(|id| serde_json::json!({ "deleted": id })));
    }

    result?;
    println!("\n{} User '{}' deleted\n", "✓".green(), email.trim());
    Ok(())
}
