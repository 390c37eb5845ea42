//! Argon2id password hasher

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::domain::result::{Error, Result};
use crate::domain::Argon2Params;
use crate::ports::PasswordHasher;

/// Hashes passwords into Argon2id PHC strings with a random salt
#[derive(Debug, Clone, Default)]
pub struct Argon2Hasher {
    params: Argon2Params,
}

impl Argon2Hasher {
    pub fn new(params: Argon2Params) -> Self {
        Self { params }
    }

    fn argon2(&self) -> Result<Argon2<'static>> {
        let params = Params::new(
            self.params.memory_cost,
            self.params.time_cost,
            self.params.parallelism,
            Some(self.params.hash_len as usize),
        )
        .map_err(|e| Error::Hashing(format!("invalid argon2 params: {}", e)))?;

        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()?
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| Error::Hashing(e.to_string()))?;
        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, encoded: &str) -> Result<bool> {
        let parsed = PasswordHash::new(encoded).map_err(|e| Error::Hashing(e.to_string()))?;
        // Cost parameters are read from the encoded hash, not from self
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}
