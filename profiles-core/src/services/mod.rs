//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

mod account_factory;
pub mod audit;
mod directory;
pub mod migration;

pub use account_factory::AccountFactory;
pub use audit::{AuditEntry, AuditEvent, AuditService, EntryPoint, EventCount};
pub use directory::{DirectoryService, UserSummary};
pub use migration::{MigrationResult, MigrationService};
