//! Audit command - view and manage the account audit log

use anyhow::{bail, Result};
use chrono::{DateTime, Duration, TimeZone, Utc};
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Confirm;

use super::get_profiles_dir;
use crate::output;
use profiles_core::{AuditService, EntryPoint};

#[derive(Subcommand)]
pub enum AuditCommands {
    /// Show recent audit entries
    List {
        /// Number of entries to show
        #[arg(short, long, default_value = "50")]
        limit: usize,
        /// Show only failed operations
        #[arg(long)]
        errors: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Clear old audit entries
    Clear {
        /// Delete entries older than N days
        #[arg(long, default_value = "30")]
        older_than_days: u32,
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show audit statistics and database path
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn get_audit_service() -> Result<AuditService> {
    let profiles_dir = get_profiles_dir()?;
    std::fs::create_dir_all(&profiles_dir)?;
    AuditService::new(&profiles_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION"))
}

/// Unix milliseconds `days` days before `now`
fn cutoff_ms(now: DateTime<Utc>, days: u32) -> Result<i64> {
    let cutoff = Duration::try_days(i64::from(days)).and_then(|d| now.checked_sub_signed(d));
    match cutoff {
        Some(cutoff) => Ok(cutoff.timestamp_millis()),
        None => bail!("--older-than-days {} reaches past the earliest representable date", days),
    }
}

fn format_timestamp(timestamp_ms: i64) -> String {
    Utc.timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| timestamp_ms.to_string())
}

pub fn run(command: AuditCommands) -> Result<()> {
    match command {
        AuditCommands::List { limit, errors, json } => {
            let service = get_audit_service()?;
            let entries = if errors {
                service.get_errors(limit)?
            } else {
                service.get_recent(limit)?
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
                return Ok(());
            }

            if entries.is_empty() {
                println!("No audit entries found.");
                return Ok(());
            }

            let mut table = output::create_table();
            table.set_header(vec!["Time", "Event", "Command", "User ID", "Error"]);

            for entry in entries {
                let error = match entry.error_kind {
                    Some(kind) => kind.red().to_string(),
                    None => String::new(),
                };

                table.add_row(vec![
                    format_timestamp(entry.timestamp),
                    entry.event,
                    entry.command.unwrap_or_default(),
                    entry.user_id.unwrap_or_default(),
                    error,
                ]);
            }

            println!("{}", table);
        }
        AuditCommands::Clear {
            older_than_days,
            force,
            json,
        } => {
            let cutoff = cutoff_ms(Utc::now(), older_than_days)?;
            let service = get_audit_service()?;

            if !force && !json {
                if !Confirm::new()
                    .with_prompt(format!(
                        "Delete audit entries older than {} days?",
                        older_than_days
                    ))
                    .default(false)
                    .interact()?
                {
                    println!("Cancelled.");
                    return Ok(());
                }
            }

            let deleted = service.delete_before(cutoff)?;

            if json {
                println!("{}", serde_json::json!({"deleted": deleted}));
            } else {
                println!("Deleted {} audit entries", deleted);
            }
        }
        AuditCommands::Stats { json } => {
            let service = get_audit_service()?;
            let total = service.count()?;
            let by_event = service.event_counts()?;
            let errors = service.count_errors()?;
            let db_path = service.db_path().to_path_buf();
            let size_bytes = std::fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "total_entries": total,
                        "error_count": errors,
                        "events": by_event,
                        "database_path": db_path.to_string_lossy(),
                        "database_size_bytes": size_bytes
                    }))?
                );
            } else {
                println!("{}", "Audit Statistics".bold());
                println!("  Total entries: {}", total);
                println!("  Errors: {}", errors);
                println!("  Database: {}", db_path.display());
                println!("  Size: {}", output::format_size(size_bytes));
                if !by_event.is_empty() {
                    println!();
                    for count in by_event {
                        println!("  {:<28} {}", count.event, count.count);
                    }
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "1970-01-01 00:00:00");
        assert_eq!(format_timestamp(1_700_000_000_000), "2023-11-14 22:13:20");
    }

    #[test]
    fn test_cutoff_ms() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        assert_eq!(cutoff_ms(now, 0).unwrap(), 1_700_000_000_000);
        assert_eq!(cutoff_ms(now, 1).unwrap(), 1_700_000_000_000 - 86_400_000);
    }

    #[test]
    fn test_cutoff_ms_out_of_range_is_error() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        assert!(cutoff_ms(now, 100_000_000).is_err());
        assert!(cutoff_ms(now, u32::MAX).is_err());
    }

    #[test]
    fn test_clear_rejects_negative_days() {
        use clap::Parser;

        #[derive(Parser)]
        struct AuditCli {
            #[command(subcommand)]
            command: AuditCommands,
        }

        assert!(AuditCli::try_parse_from(["audit", "clear", "--older-than-days", "-5"]).is_err());
        let cli = AuditCli::try_parse_from(["audit", "clear", "--older-than-days", "7"]).unwrap();
        assert!(matches!(cli.command, AuditCommands::Clear { older_than_days: 7, .. }));
    }
}
