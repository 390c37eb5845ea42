//! show command - display one account

use anyhow::Result;
use colored::Colorize;
use profiles_core::UserSummary;

use super::{get_context, print_json};

pub fn run(email: &str, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let result = ctx
        .directory_service
        .get_by_email(email)
        .map(|user| UserSummary::from(&user));

    if json {
        return print_json(result);
    }

    let user = result?;
    let last_login = user
        .last_login
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string());

    println!();
    println!("{}", user.email.bold());
    println!("  {:<12} {}", "ID:".dimmed(), user.id);
    println!("  {:<12} {}", "Name:".dimmed(), user.full_name);
    println!("  {:<12} {}", "Active:".dimmed(), user.is_active);
    println!("  {:<12} {}", "Staff:".dimmed(), user.is_staff);
    println!("  {:<12} {}", "Superuser:".dimmed(), user.is_superuser);
    println!("  {:<12} {}", "Password:".dimmed(), if user.has_usable_password { "set" } else { "unusable" });
    println!("  {:<12} {}", "Joined:".dimmed(), user.date_joined.format("%Y-%m-%d %H:%M:%S"));
    println!("  {:<12} {}", "Last login:".dimmed(), last_login);
    println!();
    Ok(())
}
