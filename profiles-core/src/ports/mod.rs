//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external collaborators. The domain and
//! services depend only on these traits, not on concrete implementations.

mod password_hasher;
mod user_store;

pub use password_hasher::PasswordHasher;
pub use user_store::{Persistable, UserStore};
