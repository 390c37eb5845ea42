//! Stored password credential

use std::fmt;

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Prefix marking a credential that can never match any password
pub const UNUSABLE_PASSWORD_PREFIX: char = '!';

/// Length of the random tail appended to unusable credentials
const UNUSABLE_PASSWORD_SUFFIX_LENGTH: usize = 40;

/// Opaque password credential: an encoded hash, or an unusable marker.
///
/// Never holds plaintext.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap an encoded hash produced by a password hasher
    pub fn from_hash(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// A credential no password will ever verify against.
    ///
    /// The random tail keeps two unusable credentials from being equal.
    pub fn unusable() -> Self {
        let tail: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(UNUSABLE_PASSWORD_SUFFIX_LENGTH)
            .map(char::from)
            .collect();
        Self(format!("{}{}", UNUSABLE_PASSWORD_PREFIX, tail))
    }

    pub fn is_usable(&self) -> bool {
        !self.0.is_empty() && !self.0.starts_with(UNUSABLE_PASSWORD_PREFIX)
    }

    /// The stored form, as persisted
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Credential {
    fn default() -> Self {
        Self::unusable()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_usable() {
            f.write_str("Credential(<hashed>)")
        } else {
            f.write_str("Credential(<unusable>)")
        }
    }
}
