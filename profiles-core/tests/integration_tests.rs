//! Integration tests for profiles-core services
//!
//! These tests run the account factory and directory service against a
//! real DuckDB file.
//!
//! Run with: cargo test --test integration_tests -- --nocapture

use std::sync::Arc;
use tempfile::TempDir;

use profiles_core::adapters::argon2::Argon2Hasher;
use profiles_core::adapters::duckdb::DuckDbUserStore;
use profiles_core::domain::Argon2Params;
use profiles_core::ports::UserStore;
use profiles_core::services::{AccountFactory, AuditService, DirectoryService};
use profiles_core::{AuditEvent, EntryPoint, Error, ExtraFields, PasswordHashable};

// ============================================================================
// Test Helpers
// ============================================================================

fn fast_hasher() -> Arc<Argon2Hasher> {
    Arc::new(Argon2Hasher::new(Argon2Params {
        time_cost: 1,
        memory_cost: 256,
        parallelism: 1,
        hash_len: 32,
    }))
}

/// Create a store on a fresh database file
fn create_test_store(temp_dir: &TempDir) -> Arc<DuckDbUserStore> {
    let db_path = temp_dir.path().join("test.duckdb");
    Arc::new(DuckDbUserStore::new(&db_path).expect("Failed to create store"))
}

fn services(store: Arc<DuckDbUserStore>) -> (AccountFactory, DirectoryService) {
    let hasher = fast_hasher();
    (
        AccountFactory::new(store.clone(), hasher.clone()),
        DirectoryService::new(store, hasher),
    )
}

// ============================================================================
// Account Creation
// ============================================================================

#[test]
fn test_create_user_persists_normalized_email() {
    let temp_dir = TempDir::new().unwrap();
    let store = create_test_store(&temp_dir);
    let (factory, directory) = services(store.clone());

    let user = factory
        .create_user(Some("a@B.COM"), Some("x"), ExtraFields::new())
        .unwrap();

    let stored = store.get_user_by_id(user.id).unwrap().unwrap();
    assert_eq!(stored.email.as_ref(), "a@b.com");
    assert_ne!(stored.identity.password.as_str(), "x");
    assert!(directory.check_password("a@b.com", "x").unwrap());
}

#[test]
fn test_create_superuser_persists_flags() {
    let temp_dir = TempDir::new().unwrap();
    let store = create_test_store(&temp_dir);
    let (factory, _) = services(store.clone());

    let user = factory
        .create_superuser(Some("admin@x.com"), Some("x"), ExtraFields::new())
        .unwrap();

    let stored = store.get_user_by_id(user.id).unwrap().unwrap();
    assert!(stored.is_staff());
    assert!(stored.is_superuser());
}

#[test]
fn test_create_superuser_with_false_flag_persists_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let store = create_test_store(&temp_dir);
    let (factory, _) = services(store.clone());

    let err = factory
        .create_superuser(
            Some("admin@x.com"),
            Some("x"),
            ExtraFields::new().with("is_staff", false),
        )
        .unwrap_err();

    assert!(matches!(err, Error::InvariantViolation(_)));
    assert_eq!(store.count_users().unwrap(), 0);
}

#[test]
fn test_duplicate_email_differing_in_domain_case() {
    let temp_dir = TempDir::new().unwrap();
    let store = create_test_store(&temp_dir);
    let (factory, _) = services(store.clone());

    factory
        .create_user(Some("ada@example.com"), None, ExtraFields::new())
        .unwrap();
    let err = factory
        .create_user(Some("ada@Example.Com"), None, ExtraFields::new())
        .unwrap_err();

    assert!(err.is_duplicate_key());
    assert_eq!(err.kind(), "duplicate_key");
    assert_eq!(store.count_users().unwrap(), 1);
}

#[test]
fn test_local_part_case_is_preserved() {
    let temp_dir = TempDir::new().unwrap();
    let store = create_test_store(&temp_dir);
    let (factory, _) = services(store.clone());

    factory
        .create_user(Some("Ada@example.com"), None, ExtraFields::new())
        .unwrap();
    factory
        .create_user(Some("ada@example.com"), None, ExtraFields::new())
        .unwrap();

    assert_eq!(store.count_users().unwrap(), 2);
}

// ============================================================================
// Directory Maintenance
// ============================================================================

#[test]
fn test_records_survive_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let user_id = {
        let (factory, _) = services(create_test_store(&temp_dir));
        factory
            .create_user(
                Some("ada@example.com"),
                Some("pw"),
                ExtraFields::new().with("first_name", "Ada"),
            )
            .unwrap()
            .id
    };

    let (_, directory) = services(create_test_store(&temp_dir));
    let user = directory.get_by_email("ada@example.com").unwrap();
    assert_eq!(user.id, user_id);
    assert_eq!(user.get_short_name(), "Ada");
    assert!(user.has_usable_password());
    assert!(directory.check_password("ada@example.com", "pw").unwrap());
}

#[test]
fn test_change_password_deactivate_delete() {
    let temp_dir = TempDir::new().unwrap();
    let store = create_test_store(&temp_dir);
    let (factory, directory) = services(store.clone());

    factory
        .create_user(Some("ada@example.com"), Some("old"), ExtraFields::new())
        .unwrap();

    directory.change_password("ada@example.com", Some("new")).unwrap();
    assert!(directory.check_password("ada@example.com", "new").unwrap());

    directory.deactivate("ada@example.com").unwrap();
    assert!(!directory.get_by_email("ada@example.com").unwrap().is_active());

    directory.delete_by_email("ada@example.com").unwrap();
    assert_eq!(directory.count().unwrap(), 0);
}

// ============================================================================
// Audit Log
// ============================================================================

#[test]
fn test_audit_log_alongside_store() {
    let temp_dir = TempDir::new().unwrap();
    let store = create_test_store(&temp_dir);
    let (factory, _) = services(store);
    let audit = AuditService::new(temp_dir.path(), EntryPoint::Embedded, "test").unwrap();

    let user = factory
        .create_user(Some("ada@example.com"), None, ExtraFields::new())
        .unwrap();
    audit
        .log(AuditEvent::new("user_created").with_user(user.id))
        .unwrap();

    let err = factory
        .create_user(Some("ada@example.com"), None, ExtraFields::new())
        .unwrap_err();
    audit
        .log(AuditEvent::new("user_create_failed").with_error(&err))
        .unwrap();

    assert_eq!(audit.count().unwrap(), 2);
    assert_eq!(audit.get_for_user(user.id, 10).unwrap().len(), 1);
    assert_eq!(
        audit.get_errors(10).unwrap()[0].error_kind.as_deref(),
        Some("duplicate_key")
    );
}
