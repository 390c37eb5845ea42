//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - DuckDB for the UserStore port
//! - A locked in-memory map for the UserStore port (tests, embedding)
//! - Argon2id for the PasswordHasher port

pub mod argon2;
pub mod duckdb;
pub mod memory;
