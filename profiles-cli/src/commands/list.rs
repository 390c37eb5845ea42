//! list command - show all accounts

use anyhow::Result;
use colored::Colorize;

use super::{get_context, print_json};
use crate::output;

fn flag(value: bool) -> String {
    if value {
        "yes".green().to_string()
    } else {
        "no".dimmed().to_string()
    }
}

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let result = ctx.directory_service.list_users();

    if json {
        return print_json(result);
    }

    let users = result?;
    if users.is_empty() {
        println!("No users found.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["Email", "Name", "Active", "Staff", "Superuser", "Joined"]);

    for user in &users {
        table.add_row(vec![
            user.email.clone(),
            user.full_name.clone(),
            flag(user.is_active),
            flag(user.is_staff),
            flag(user.is_superuser),
            user.date_joined.format("%Y-%m-%d").to_string(),
        ]);
    }

    println!("{}", table);
    println!("{}", format!("{} user(s)", users.len()).dimmed());
    Ok(())
}
