//! Core domain entities
//!
//! Account records and their value objects. Pure data structures with
//! validation logic; no I/O.

mod credential;
pub mod email;
mod extra_fields;
pub mod hashing;
mod identity;
pub mod result;
pub mod user;

pub use credential::{Credential, UNUSABLE_PASSWORD_PREFIX};
pub use email::{normalize_email, Email, EmailFormatError};
pub use extra_fields::ExtraFields;
pub use hashing::Argon2Params;
pub use identity::{BaseIdentity, PasswordHashable};
pub use user::User;
