//! Configuration management
//!
//! Settings live in `settings.json` inside the profiles directory:
//! ```json
//! {
//!   "hashing": { "timeCost": 3, "memoryCost": 65536, "parallelism": 4, "hashLen": 32 },
//!   "database": { "filename": "profiles.duckdb" }
//! }
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::domain::Argon2Params;

/// Database file used when settings name none
pub const DEFAULT_DATABASE_FILENAME: &str = "profiles.duckdb";

/// Environment variable overriding the database file name
pub const DATABASE_ENV_VAR: &str = "PROFILES_DATABASE";

const SETTINGS_FILENAME: &str = "settings.json";

/// Raw settings.json structure
///
/// Keys this crate does not manage are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    hashing: Argon2Params,
    #[serde(default)]
    database: DatabaseSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DatabaseSettings {
    #[serde(default)]
    filename: Option<String>,
}

/// Profiles configuration (simplified view of settings)
#[derive(Debug, Clone)]
pub struct Config {
    pub hashing: Argon2Params,
    pub database_filename: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hashing: Argon2Params::default(),
            database_filename: DEFAULT_DATABASE_FILENAME.to_string(),
        }
    }
}

impl Config {
    /// Load config from the profiles directory.
    ///
    /// A missing or malformed settings file yields defaults. The database
    /// file name can be overridden with PROFILES_DATABASE.
    pub fn load(profiles_dir: &Path) -> Result<Self> {
        let raw = read_settings(&profiles_dir.join(SETTINGS_FILENAME))?;

        let database_filename = match std::env::var(DATABASE_ENV_VAR) {
            Ok(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => raw
                .database
                .filename
                .clone()
                .unwrap_or_else(|| DEFAULT_DATABASE_FILENAME.to_string()),
        };

        Ok(Self {
            hashing: raw.hashing,
            database_filename,
        })
    }

    /// Full path of the user database
    pub fn database_path(&self, profiles_dir: &Path) -> PathBuf {
        profiles_dir.join(&self.database_filename)
    }
}

fn read_settings(path: &Path) -> Result<SettingsFile> {
    if !path.exists() {
        return Ok(SettingsFile::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(serde_json::from_str(&content).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "ignoring malformed settings file");
        SettingsFile::default()
    }))
}
