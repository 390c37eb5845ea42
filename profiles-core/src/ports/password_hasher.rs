//! Password hasher port

use crate::domain::result::Result;

/// One-way password hashing.
///
/// The encoded form is self-describing (algorithm, parameters, salt), so
/// `verify` needs nothing but the stored string.
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password into its encoded form
    fn hash(&self, password: &str) -> Result<String>;

    /// Check a plaintext password against an encoded hash
    fn verify(&self, password: &str, encoded: &str) -> Result<bool>;
}
