//! createsuperuser command - create an account with staff and superuser status

use std::env;

use anyhow::{bail, Result};
use colored::Colorize;
use dialoguer::Input;
use profiles_core::domain::user::{REQUIRED_FIELDS, USERNAME_FIELD};
use profiles_core::{AuditEvent, Email, ExtraFields, ProfilesContext, UserSummary};

use super::{
    get_context, get_logger, is_interactive, log_event, print_json, prompt_email,
    prompt_new_password,
};
use crate::output;

/// Password source for --noinput
pub const PASSWORD_ENV_VAR: &str = "PROFILES_SUPERUSER_PASSWORD";

/// Email source for --noinput when --email is not given
pub const EMAIL_ENV_VAR: &str = "PROFILES_SUPERUSER_EMAIL";

pub struct CreateSuperuserArgs {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub noinput: bool,
    pub json: bool,
}

pub fn run(args: CreateSuperuserArgs) -> Result<()> {
    let logger = get_logger();
    let ctx = get_context()?;

    let noinput = args.noinput || args.json || !is_interactive();
    let (email, password, extra) = if noinput {
        gather_noinput(args.email, args.first_name, args.last_name)
    } else {
        gather_interactive(&ctx, args.email, args.first_name, args.last_name)?
    };

    let result = ctx
        .account_factory
        .create_superuser(email.as_deref(), password.as_deref(), extra);

    match &result {
        Ok(user) => log_event(
            &logger,
            AuditEvent::new("superuser_created")
                .with_command("createsuperuser")
                .with_user(user.id),
        ),
        Err(e) => log_event(
            &logger,
            AuditEvent::new("superuser_create_failed")
                .with_command("createsuperuser")
                .with_error(e),
        ),
    }

    if args.json {
        return print_json(result.map(|user| UserSummary::from(&user)));
    }

    let user = result?;
    println!("\n{} Superuser {} created\n", "✓".green(), user.email.to_string().bold());
    Ok(())
}

/// Everything from flags and environment; a missing password leaves the
/// account without a usable one
fn gather_noinput(
    email: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
) -> (Option<String>, Option<String>, ExtraFields) {
    let email = email.or_else(|| env::var(EMAIL_ENV_VAR).ok());
    let password = env::var(PASSWORD_ENV_VAR).ok().filter(|p| !p.is_empty());

    let mut extra = ExtraFields::new();
    if let Some(first) = first_name {
        extra.insert("first_name", first);
    }
    if let Some(last) = last_name {
        extra.insert("last_name", last);
    }
    (email, password, extra)
}

fn gather_interactive(
    ctx: &ProfilesContext,
    email: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
) -> Result<(Option<String>, Option<String>, ExtraFields)> {
    let email = match email {
        Some(raw) => {
            let email = Email::parse(Some(raw.as_str()))?;
            ensure_available(ctx, &email)?;
            email
        }
        None => loop {
            let email = prompt_email(&capitalize(USERNAME_FIELD))?;
            match ensure_available(ctx, &email) {
                Ok(()) => break email,
                Err(e) => output::error(&format!("Error: {}", e)),
            }
        },
    };

    let mut extra = ExtraFields::new();
    for field in REQUIRED_FIELDS {
        let given = match *field {
            "first_name" => first_name.clone(),
            "last_name" => last_name.clone(),
            _ => None,
        };
        let value = match given {
            Some(v) => v,
            None => Input::<String>::new()
                .with_prompt(capitalize(&field.replace('_', " ")))
                .allow_empty(true)
                .interact_text()?,
        };
        extra.insert(*field, value);
    }

    let password = loop {
        match prompt_new_password("Password") {
            Ok(Some(p)) => break p,
            Ok(None) => output::error("Error: Blank passwords aren't allowed."),
            Err(e) => output::error(&format!("Error: {}", e)),
        }
    };

    Ok((Some(email.to_string()), Some(password), extra))
}

fn ensure_available(ctx: &ProfilesContext, email: &Email) -> Result<()> {
    if ctx.directory_service.find_by_email(email.as_ref())?.is_some() {
        bail!("That {} is already taken.", USERNAME_FIELD);
    }
    Ok(())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("email"), "Email");
        assert_eq!(capitalize("first name"), "First name");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_gather_noinput_uses_flags() {
        let (email, _, extra) = gather_noinput(
            Some("admin@example.com".to_string()),
            Some("Ada".to_string()),
            None,
        );
        assert_eq!(email.as_deref(), Some("admin@example.com"));
        assert_eq!(extra.get("first_name"), Some(&serde_json::json!("Ada")));
        assert!(extra.get("last_name").is_none());
    }
}
