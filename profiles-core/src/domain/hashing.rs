//! Password hashing parameters

use serde::{Deserialize, Serialize};

/// Default Argon2id parameters
pub const DEFAULT_TIME_COST: u32 = 3;
pub const DEFAULT_MEMORY_COST: u32 = 65536; // 64 MiB
pub const DEFAULT_PARALLELISM: u32 = 4;
pub const DEFAULT_HASH_LEN: u32 = 32;

/// Argon2id cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Argon2Params {
    pub time_cost: u32,
    /// KiB
    pub memory_cost: u32,
    pub parallelism: u32,
    pub hash_len: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            time_cost: DEFAULT_TIME_COST,
            memory_cost: DEFAULT_MEMORY_COST,
            parallelism: DEFAULT_PARALLELISM,
            hash_len: DEFAULT_HASH_LEN,
        }
    }
}
