//! Audit service - account event log in DuckDB
//!
//! Records what happened to which account id, stored in audit.duckdb.
//! Emails, names and credentials are never written; failures are recorded
//! by error kind only.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, Result};
use chrono::Utc;
use duckdb::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit_migrations::AUDIT_MIGRATIONS;
use crate::domain::result::Error;
use crate::services::MigrationService;

/// File name of the audit database inside the profiles directory
pub const AUDIT_DB_FILENAME: &str = "audit.duckdb";

/// Counter for generating unique IDs within the same millisecond
static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Timestamp shifted into the upper bits, per-millisecond counter in the lower 16
fn generate_id() -> u64 {
    let timestamp = now_ms() as u64;
    let counter = ID_COUNTER.fetch_add(1, Ordering::Relaxed) & 0xFFFF;
    (timestamp << 16) | counter
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

fn detect_platform() -> &'static str {
    if cfg!(target_os = "macos") {
        "macos"
    } else if cfg!(target_os = "windows") {
        "windows"
    } else if cfg!(target_os = "linux") {
        "linux"
    } else {
        "unknown"
    }
}

/// Who is writing to the audit log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryPoint {
    Cli,
    Embedded,
}

impl EntryPoint {
    fn as_str(&self) -> &'static str {
        match self {
            EntryPoint::Cli => "cli",
            EntryPoint::Embedded => "embedded",
        }
    }
}

/// An event to be recorded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
}

impl AuditEvent {
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            command: None,
            user_id: None,
            error_kind: None,
        }
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Record the kind of a core error, never its message
    pub fn with_error(mut self, error: &Error) -> Self {
        self.error_kind = Some(error.kind().to_string());
        self
    }
}

/// An audit entry as stored in the database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: u64,
    pub timestamp: i64,
    pub entry_point: String,
    pub app_version: String,
    pub platform: String,
    pub event: String,
    pub command: Option<String>,
    pub user_id: Option<String>,
    pub error_kind: Option<String>,
}

/// Number of entries per event name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCount {
    pub event: String,
    pub count: u64,
}

const SELECT_ENTRY: &str = "SELECT id, timestamp, entry_point, app_version, platform,
        event, command, user_id, error_kind
 FROM sys_audit_log";

pub struct AuditService {
    conn: Mutex<Connection>,
    db_path: PathBuf,
    entry_point: EntryPoint,
    app_version: String,
    platform: &'static str,
}

impl AuditService {
    /// Open or create audit.duckdb in the profiles directory and run any
    /// pending migrations
    pub fn new(
        profiles_dir: &Path,
        entry_point: EntryPoint,
        app_version: impl Into<String>,
    ) -> Result<Self> {
        let db_path = profiles_dir.join(AUDIT_DB_FILENAME);
        let conn = Connection::open(&db_path)?;

        let service = Self {
            conn: Mutex::new(conn),
            db_path,
            entry_point,
            app_version: app_version.into(),
            platform: detect_platform(),
        };

        {
            let conn = service.lock()?;
            MigrationService::new(&conn, AUDIT_MIGRATIONS).run_pending()?;
        }

        Ok(service)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))
    }

    /// Record an event, stamped with entry point, version and platform
    pub fn log(&self, event: AuditEvent) -> Result<()> {
        let conn = self.lock()?;

        conn.execute(
            r#"
            INSERT INTO sys_audit_log (
                id, timestamp, entry_point, app_version, platform,
                event, command, user_id, error_kind
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            duckdb::params![
                generate_id(),
                now_ms(),
                self.entry_point.as_str(),
                &self.app_version,
                self.platform,
                &event.event,
                &event.command,
                event.user_id.map(|id| id.to_string()),
                &event.error_kind,
            ],
        )?;

        Ok(())
    }

    pub fn log_event(&self, event: &str) -> Result<()> {
        self.log(AuditEvent::new(event))
    }

    /// Most recent entries first
    pub fn get_recent(&self, limit: usize) -> Result<Vec<AuditEntry>> {
        self.query_entries(
            &format!("{} ORDER BY timestamp DESC, id DESC LIMIT ?", SELECT_ENTRY),
            limit,
        )
    }

    /// Most recent failed events first
    pub fn get_errors(&self, limit: usize) -> Result<Vec<AuditEntry>> {
        self.query_entries(
            &format!(
                "{} WHERE error_kind IS NOT NULL ORDER BY timestamp DESC, id DESC LIMIT ?",
                SELECT_ENTRY
            ),
            limit,
        )
    }

    /// Entries for one account, most recent first
    pub fn get_for_user(&self, user_id: Uuid, limit: usize) -> Result<Vec<AuditEntry>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE user_id = ? ORDER BY timestamp DESC, id DESC LIMIT ?",
            SELECT_ENTRY
        ))?;
        let entries = stmt
            .query_map(duckdb::params![user_id.to_string(), limit as i64], map_entry)?
            .collect::<duckdb::Result<Vec<_>>>()?;
        Ok(entries)
    }

    fn query_entries(&self, sql: &str, limit: usize) -> Result<Vec<AuditEntry>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let entries = stmt
            .query_map([limit as i64], map_entry)?
            .collect::<duckdb::Result<Vec<_>>>()?;
        Ok(entries)
    }

    /// Entry counts grouped by event name, most frequent first
    pub fn event_counts(&self) -> Result<Vec<EventCount>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT event, COUNT(*) AS n FROM sys_audit_log GROUP BY event ORDER BY n DESC, event",
        )?;
        let counts = stmt
            .query_map([], |row| {
                Ok(EventCount {
                    event: row.get(0)?,
                    count: row.get::<_, i64>(1)? as u64,
                })
            })?
            .collect::<duckdb::Result<Vec<_>>>()?;
        Ok(counts)
    }

    pub fn count(&self) -> Result<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM sys_audit_log", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Number of failed events, unbounded by any listing limit
    pub fn count_errors(&self) -> Result<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sys_audit_log WHERE error_kind IS NOT NULL",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Delete entries older than the given unix timestamp in milliseconds
    pub fn delete_before(&self, timestamp_ms: i64) -> Result<u64> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            "DELETE FROM sys_audit_log WHERE timestamp < ?",
            [timestamp_ms],
        )?;
        Ok(deleted as u64)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

fn map_entry(row: &duckdb::Row) -> duckdb::Result<AuditEntry> {
    Ok(AuditEntry {
        id: row.get(0)?,
        timestamp: row.get(1)?,
        entry_point: row.get(2)?,
        app_version: row.get(3)?,
        platform: row.get(4)?,
        event: row.get(5)?,
        command: row.get(6)?,
        user_id: row.get(7)?,
        error_kind: row.get(8)?,
    })
}
