//! DuckDB user store implementation

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use duckdb::{params, Connection, Row};
use uuid::Uuid;

use crate::domain::result::{Error, Result, StoreError};
use crate::domain::{BaseIdentity, Credential, Email, User};
use crate::migrations::MIGRATIONS;
use crate::ports::UserStore;
use crate::services::{MigrationResult, MigrationService};

/// Maximum number of retries when database file is locked
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100, 200, 400, 800ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

const SELECT_USER: &str = "SELECT user_id, email, first_name, last_name, password, last_login,
        is_active, is_staff, is_superuser, date_joined
 FROM sys_users";

/// Check if an error message indicates a file locking issue that should be retried
pub fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    // Windows error messages
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        // Unix/macOS error messages
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("file is already open")
        || lower.contains("could not set lock on file")
}

/// Sort a DuckDB error into the store error kinds.
///
/// DuckDB reports constraint failures as "Constraint Error: Duplicate key ..."
/// or "Constraint Error: CHECK constraint failed ...".
pub fn classify_error(err_msg: &str) -> StoreError {
    let lower = err_msg.to_lowercase();
    if lower.contains("duplicate key") || lower.contains("unique constraint") {
        StoreError::DuplicateKey(err_msg.to_string())
    } else if lower.contains("constraint") {
        StoreError::Constraint(err_msg.to_string())
    } else {
        StoreError::Database(err_msg.to_string())
    }
}

impl From<duckdb::Error> for Error {
    fn from(e: duckdb::Error) -> Self {
        Error::Storage(classify_error(&e.to_string()))
    }
}

/// User store backed by a single DuckDB file.
///
/// All statements go through one connection behind a mutex; the UNIQUE and
/// CHECK constraints on sys_users are the final word on duplicates and on
/// the superuser/staff rule.
pub struct DuckDbUserStore {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl DuckDbUserStore {
    /// Open (or create) the database file and bring its schema up to date.
    ///
    /// Retries with exponential backoff while another process holds the
    /// file lock.
    pub fn new(db_path: &Path) -> Result<Self> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            match Self::try_open_connection(db_path) {
                Ok(conn) => {
                    let store = Self {
                        conn: Mutex::new(conn),
                        db_path: Some(db_path.to_path_buf()),
                    };
                    store.ensure_schema()?;
                    return Ok(store);
                }
                Err(e) => {
                    let err_msg = e.to_string();
                    if is_retryable_error(&err_msg) && attempt < MAX_RETRIES - 1 {
                        let delay =
                            Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt));
                        tracing::warn!(
                            delay_ms = delay.as_millis() as u64,
                            attempt = attempt + 1,
                            max = MAX_RETRIES,
                            error = %err_msg,
                            "database busy, retrying"
                        );
                        thread::sleep(delay);
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }

        Err(match last_error {
            Some(e) => e.into(),
            None => StoreError::Database(format!(
                "Failed to open database after {} retries",
                MAX_RETRIES
            ))
            .into(),
        })
    }

    /// A throwaway in-memory database with the schema applied
    pub fn open_in_memory() -> Result<Self> {
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        let store = Self {
            conn: Mutex::new(Connection::open_in_memory_with_flags(config)?),
            db_path: None,
        };
        store.ensure_schema()?;
        Ok(store)
    }

    fn try_open_connection(db_path: &Path) -> duckdb::Result<Connection> {
        // Extension autoloading stays off; the store only needs core SQL
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        Connection::open_with_flags(db_path, config)
    }

    /// Path of the database file, `None` when in memory
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Run pending migrations
    pub fn run_migrations(&self) -> Result<MigrationResult> {
        let conn = self.lock()?;
        MigrationService::new(&conn, MIGRATIONS).run_pending()
    }

    pub fn ensure_schema(&self) -> Result<()> {
        let result = self.run_migrations()?;
        if !result.applied.is_empty() {
            tracing::debug!(applied = ?result.applied, "user store migrations applied");
        }
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Database("connection lock poisoned".to_string()).into())
    }

    fn query_users(&self, sql: &str, param: Option<&str>) -> Result<Vec<User>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = match param {
            Some(p) => stmt
                .query_map([p], UserRow::from_row)?
                .collect::<duckdb::Result<Vec<_>>>()?,
            None => stmt
                .query_map([], UserRow::from_row)?
                .collect::<duckdb::Result<Vec<_>>>()?,
        };
        rows.into_iter().map(User::try_from).collect()
    }
}

impl UserStore for DuckDbUserStore {
    fn save_user(&self, user: &User) -> Result<()> {
        let conn = self.lock()?;

        let existing_email: Option<String> = conn
            .prepare("SELECT email FROM sys_users WHERE user_id = ?")?
            .query_map([user.id.to_string()], |row| row.get(0))?
            .next()
            .transpose()?;

        let last_login = user.identity.last_login.map(|t| t.to_rfc3339());

        match existing_email {
            Some(stored) => {
                // Both updates land together or not at all
                let tx = conn.unchecked_transaction()?;
                // Indexed columns are only rewritten when they change
                if stored != user.email.to_string() {
                    tx.execute(
                        "UPDATE sys_users SET email = ? WHERE user_id = ?",
                        params![user.email.as_ref(), user.id.to_string()],
                    )?;
                }
                tx.execute(
                    "UPDATE sys_users SET first_name = ?, last_name = ?, password = ?,
                            last_login = ?, is_active = ?, is_staff = ?, is_superuser = ?,
                            date_joined = ?
                     WHERE user_id = ?",
                    params![
                        user.first_name,
                        user.last_name,
                        user.identity.password.as_str(),
                        last_login,
                        user.identity.is_active,
                        user.identity.is_staff,
                        user.identity.is_superuser,
                        user.date_joined.to_rfc3339(),
                        user.id.to_string(),
                    ],
                )?;
                tx.commit()?;
            }
            None => {
                conn.execute(
                    "INSERT INTO sys_users (user_id, email, first_name, last_name, password,
                            last_login, is_active, is_staff, is_superuser, date_joined)
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                    params![
                        user.id.to_string(),
                        user.email.as_ref(),
                        user.first_name,
                        user.last_name,
                        user.identity.password.as_str(),
                        last_login,
                        user.identity.is_active,
                        user.identity.is_staff,
                        user.identity.is_superuser,
                        user.date_joined.to_rfc3339(),
                    ],
                )?;
            }
        }
        Ok(())
    }

    fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let sql = format!("{} WHERE user_id = ?", SELECT_USER);
        Ok(self
            .query_users(&sql, Some(id.to_string().as_str()))?
            .into_iter()
            .next())
    }

    fn get_user_by_email(&self, email: &Email) -> Result<Option<User>> {
        let sql = format!("{} WHERE email = ?", SELECT_USER);
        Ok(self
            .query_users(&sql, Some(email.as_ref()))?
            .into_iter()
            .next())
    }

    fn list_users(&self) -> Result<Vec<User>> {
        let sql = format!("{} ORDER BY date_joined, user_id", SELECT_USER);
        self.query_users(&sql, None)
    }

    fn delete_user(&self, id: Uuid) -> Result<bool> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            "DELETE FROM sys_users WHERE user_id = ?",
            [id.to_string()],
        )?;
        Ok(deleted > 0)
    }

    fn count_users(&self) -> Result<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM sys_users", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

/// Raw column values of one sys_users row
struct UserRow {
    user_id: String,
    email: String,
    first_name: String,
    last_name: String,
    password: String,
    last_login: Option<String>,
    is_active: bool,
    is_staff: bool,
    is_superuser: bool,
    date_joined: String,
}

impl UserRow {
    fn from_row(row: &Row) -> duckdb::Result<Self> {
        Ok(Self {
            user_id: row.get(0)?,
            email: row.get(1)?,
            first_name: row.get(2)?,
            last_name: row.get(3)?,
            password: row.get(4)?,
            last_login: row.get(5)?,
            is_active: row.get(6)?,
            is_staff: row.get(7)?,
            is_superuser: row.get(8)?,
            date_joined: row.get(9)?,
        })
    }
}

impl TryFrom<UserRow> for User {
    type Error = Error;

    fn try_from(row: UserRow) -> Result<Self> {
        let id = Uuid::parse_str(&row.user_id)
            .map_err(|e| corrupt("user_id", &row.user_id, e))?;
        let last_login = match row.last_login {
            Some(ref s) => Some(parse_timestamp("last_login", s)?),
            None => None,
        };

        Ok(User {
            id,
            email: Email::try_from(row.email)?,
            first_name: row.first_name,
            last_name: row.last_name,
            date_joined: parse_timestamp("date_joined", &row.date_joined)?,
            identity: BaseIdentity {
                password: Credential::from_hash(row.password),
                last_login,
                is_active: row.is_active,
                is_staff: row.is_staff,
                is_superuser: row.is_superuser,
            },
        })
    }
}

fn parse_timestamp(column: &str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| corrupt(column, value, e))
}

fn corrupt(column: &str, value: &str, e: impl std::fmt::Display) -> Error {
    StoreError::Database(format!("corrupt {} value {:?}: {}", column, value, e)).into()
}
