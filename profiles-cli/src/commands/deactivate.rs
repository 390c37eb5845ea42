//! deactivate command - mark an account inactive

use anyhow::Result;
use colored::Colorize;
use profiles_core::{AuditEvent, UserSummary};

use super::{get_context, get_logger, log_event, print_json};

pub fn run(email: &str, json: bool) -> Result<()> {
    let logger = get_logger();
    let ctx = get_context()?;
    let result = ctx.directory_service.deactivate(email);

    match &result {
        Ok(user) => log_event(
            &logger,
            AuditEvent::new("user_deactivated")
                .with_command("deactivate")
                .with_user(user.id),
        ),
        Err(e) => log_event(
            &logger,
            AuditEvent::new("user_deactivate_failed")
                .with_command("deactivate")
                .with_error(e),
        ),
    }

    if json {
        return print_json(result.map(|user| UserSummary::from(&user)));
    }

    let user = result?;
    println!("\n{} User {} deactivated\n", "✓".green(), user.email);
    Ok(())
}
