//! Profiles Core - email-identity account records
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Account record, email, credential and error types
//! - **ports**: Trait definitions for external collaborators (UserStore, PasswordHasher)
//! - **services**: Account creation, directory lookups, audit log
//! - **adapters**: Concrete implementations (DuckDB, in-memory, Argon2)

pub mod adapters;
pub mod audit_migrations;
pub mod config;
pub mod domain;
pub mod migrations;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use adapters::argon2::Argon2Hasher;
use adapters::duckdb::DuckDbUserStore;
use config::Config;
use services::{AccountFactory, DirectoryService};

// Re-export commonly used types at crate root
pub use domain::result::{Error, OperationResult, StoreError};
pub use domain::{Email, ExtraFields, PasswordHashable, User};
pub use services::{AuditEvent, AuditService, EntryPoint, UserSummary};

/// Main context for profiles operations
///
/// Holds the configuration, the DuckDB store and the services built on it.
pub struct ProfilesContext {
    pub config: Config,
    pub store: Arc<DuckDbUserStore>,
    pub account_factory: AccountFactory,
    pub directory_service: DirectoryService,
}

impl ProfilesContext {
    /// Open the profiles directory, creating it and its database as needed
    pub fn new(profiles_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(profiles_dir)
            .with_context(|| format!("Failed to create {}", profiles_dir.display()))?;
        let config = Config::load(profiles_dir)?;

        let db_path = config.database_path(profiles_dir);
        let store = Arc::new(
            DuckDbUserStore::new(&db_path)
                .with_context(|| format!("Failed to open {}", db_path.display()))?,
        );
        let hasher = Arc::new(Argon2Hasher::new(config.hashing));

        let account_factory = AccountFactory::new(store.clone(), hasher.clone());
        let directory_service = DirectoryService::new(store.clone(), hasher);

        Ok(Self {
            config,
            store,
            account_factory,
            directory_service,
        })
    }
}
