//! CLI command implementations

pub mod audit;
pub mod change_password;
pub mod create_superuser;
pub mod create_user;
pub mod deactivate;
pub mod delete;
pub mod list;
pub mod show;

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use dialoguer::{Input, Password};
use profiles_core::services::AccountFactory;
use profiles_core::{AuditEvent, AuditService, Email, EntryPoint, OperationResult, ProfilesContext};
use serde::Serialize;

use crate::output;

/// Get the audit service for CLI operations
///
/// Returns None if the audit log fails to open (shouldn't block operations)
pub fn get_logger() -> Option<AuditService> {
    let profiles_dir = get_profiles_dir().ok()?;
    std::fs::create_dir_all(&profiles_dir).ok()?;
    AuditService::new(&profiles_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION")).ok()
}

/// Record an audit event, ignoring any errors (auditing never breaks a command)
pub fn log_event(logger: &Option<AuditService>, event: AuditEvent) {
    if let Some(l) = logger {
        if let Err(e) = l.log(event) {
            tracing::debug!(error = %e, "audit log write failed");
        }
    }
}

/// Get the profiles directory from PROFILES_DIR or ~/.profiles
pub fn get_profiles_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("PROFILES_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".profiles"))
        .ok_or_else(|| anyhow!("Could not find home directory; set PROFILES_DIR"))
}

/// Open the profiles context
pub fn get_context() -> Result<ProfilesContext> {
    let profiles_dir = get_profiles_dir()?;
    ProfilesContext::new(&profiles_dir).context("Failed to initialize profiles context")
}

/// Whether prompts can be shown
pub fn is_interactive() -> bool {
    atty::is(atty::Stream::Stdin)
}

/// Print an outcome as an `OperationResult`, exiting non-zero on failure
pub fn print_json<T: Serialize>(result: profiles_core::domain::result::Result<T>) -> Result<()> {
    let failed = result.is_err();
    let op: OperationResult<T> = result.into();
    println!("{}", serde_json::to_string_pretty(&op)?);
    if failed {
        std::process::exit(1);
    }
    Ok(())
}

/// Prompt until a well-formed email is entered
pub fn prompt_email(prompt: &str) -> Result<Email> {
    loop {
        let raw: String = Input::new().with_prompt(prompt).interact_text()?;
        match AccountFactory::validate_email(Some(raw.as_str())) {
            Ok(email) => return Ok(email),
            Err(e) => output::error(&format!("Error: {}", e)),
        }
    }
}

/// Prompt for a password twice; blank input means no usable password
pub fn prompt_new_password(prompt: &str) -> Result<Option<String>> {
    let first = Password::new()
        .with_prompt(prompt)
        .allow_empty_password(true)
        .interact()?;
    if first.is_empty() {
        return Ok(None);
    }
    let second = Password::new()
        .with_prompt(format!("{} (again)", prompt))
        .interact()?;
    if first != second {
        bail!("Passwords do not match");
    }
    Ok(Some(first))
}
