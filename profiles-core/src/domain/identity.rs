//! Base identity state shared by every account record

use chrono::{DateTime, Utc};

use super::credential::Credential;
use super::result::{Error, Result};
use crate::ports::PasswordHasher;

/// Generic authentication fields: account-state flags, the password
/// credential and the last login time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseIdentity {
    pub password: Credential,
    pub last_login: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl Default for BaseIdentity {
    fn default() -> Self {
        Self {
            password: Credential::unusable(),
            last_login: None,
            is_active: true,
            is_staff: false,
            is_superuser: false,
        }
    }
}

impl BaseIdentity {
    /// Superuser status requires staff status
    pub fn check_flags(&self) -> Result<()> {
        if self.is_superuser && !self.is_staff {
            return Err(Error::invariant("Superuser must have is_staff=True."));
        }
        Ok(())
    }
}

/// Capability of records that carry a password credential
pub trait PasswordHashable {
    fn identity(&self) -> &BaseIdentity;
    fn identity_mut(&mut self) -> &mut BaseIdentity;

    /// Hash and store `raw`; `None` stores an unusable credential
    fn set_password(&mut self, raw: Option<&str>, hasher: &dyn PasswordHasher) -> Result<()> {
        let credential = match raw {
            Some(raw) => Credential::from_hash(hasher.hash(raw)?),
            None => Credential::unusable(),
        };
        self.identity_mut().password = credential;
        Ok(())
    }

    fn set_unusable_password(&mut self) {
        self.identity_mut().password = Credential::unusable();
    }

    fn has_usable_password(&self) -> bool {
        self.identity().password.is_usable()
    }

    /// Verify `raw` against the stored credential.
    ///
    /// Unusable credentials never match.
    fn check_password(&self, raw: &str, hasher: &dyn PasswordHasher) -> Result<bool> {
        let credential = &self.identity().password;
        if !credential.is_usable() {
            return Ok(false);
        }
        hasher.verify(raw, credential.as_str())
    }
}
