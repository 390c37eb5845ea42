//! Account factory - the only way account records come into existence

use std::sync::Arc;

use serde_json::Value;

use crate::domain::result::{Error, Result};
use crate::domain::{Email, ExtraFields, PasswordHashable, User};
use crate::ports::{PasswordHasher, Persistable, UserStore};

/// Flags a superuser must carry
const SUPERUSER_FLAGS: [&str; 2] = ["is_staff", "is_superuser"];

/// Builds, validates and persists account records.
///
/// Holds no mutable state; concurrent calls only meet at the store, which
/// settles duplicate emails.
pub struct AccountFactory {
    store: Arc<dyn UserStore>,
    hasher: Arc<dyn PasswordHasher>,
}

impl AccountFactory {
    pub fn new(store: Arc<dyn UserStore>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { store, hasher }
    }

    /// Check that an email is present and normalize it
    pub fn validate_email(email: Option<&str>) -> Result<Email> {
        Email::parse(email)
    }

    /// Create and persist a regular account.
    ///
    /// A `None` password leaves the account with an unusable credential.
    pub fn create_user(
        &self,
        email: Option<&str>,
        password: Option<&str>,
        extra_fields: ExtraFields,
    ) -> Result<User> {
        let email = Self::validate_email(email)?;

        let mut user = User::new(email);
        user.apply_fields(&extra_fields)?;
        user.validate()?;
        user.set_password(password, self.hasher.as_ref())?;
        user.save(self.store.as_ref())?;

        tracing::info!(
            user_id = %user.id,
            is_staff = user.is_staff(),
            is_superuser = user.is_superuser(),
            "account created"
        );
        Ok(user)
    }

    /// Create and persist an account with staff and superuser status.
    ///
    /// Either flag explicitly set to anything but `true` is rejected before
    /// hashing or persisting.
    pub fn create_superuser(
        &self,
        email: Option<&str>,
        password: Option<&str>,
        mut extra_fields: ExtraFields,
    ) -> Result<User> {
        for flag in SUPERUSER_FLAGS {
            extra_fields.set_default(flag, true);
            if extra_fields.get(flag) != Some(&Value::Bool(true)) {
                return Err(Error::invariant(format!("Superuser must have {}=True.", flag)));
            }
        }

        self.create_user(email, password, extra_fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use uuid::Uuid;

    use crate::adapters::argon2::Argon2Hasher;
    use crate::adapters::memory::InMemoryUserStore;
    use crate::domain::Argon2Params;

    /// Store double that counts writes and keeps nothing
    #[derive(Default)]
    struct CountingStore {
        saves: AtomicUsize,
    }

    impl UserStore for CountingStore {
        fn save_user(&self, _user: &User) -> Result<()> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn get_user_by_id(&self, _id: Uuid) -> Result<Option<User>> {
            Ok(None)
        }

        fn get_user_by_email(&self, _email: &Email) -> Result<Option<User>> {
            Ok(None)
        }

        fn list_users(&self) -> Result<Vec<User>> {
            Ok(Vec::new())
        }

        fn delete_user(&self, _id: Uuid) -> Result<bool> {
            Ok(false)
        }

        fn count_users(&self) -> Result<u64> {
            Ok(self.saves.load(Ordering::SeqCst) as u64)
        }
    }

    /// Hasher double that counts calls
    #[derive(Default)]
    struct CountingHasher {
        calls: AtomicUsize,
    }

    impl PasswordHasher for CountingHasher {
        fn hash(&self, password: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("counted${}", password.len()))
        }

        fn verify(&self, password: &str, encoded: &str) -> Result<bool> {
            Ok(encoded == format!("counted${}", password.len()))
        }
    }

    fn fast_hasher() -> Arc<Argon2Hasher> {
        Arc::new(Argon2Hasher::new(Argon2Params {
            time_cost: 1,
            memory_cost: 256,
            parallelism: 1,
            hash_len: 32,
        }))
    }

    fn factory() -> (AccountFactory, Arc<InMemoryUserStore>) {
        let store = Arc::new(InMemoryUserStore::new());
        (AccountFactory::new(store.clone(), fast_hasher()), store)
    }

    #[test]
    fn test_validate_email() {
        assert_eq!(
            AccountFactory::validate_email(Some("  Ada@Example.COM ")).unwrap().as_ref(),
            "Ada@example.com"
        );
        assert!(matches!(
            AccountFactory::validate_email(None),
            Err(Error::MissingField("email"))
        ));
        assert!(matches!(
            AccountFactory::validate_email(Some("")),
            Err(Error::MissingField("email"))
        ));
        assert!(matches!(
            AccountFactory::validate_email(Some("   ")),
            Err(Error::MissingField("email"))
        ));
        assert!(matches!(
            AccountFactory::validate_email(Some("not-an-email-that-breaks-normalization")),
            Err(Error::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_create_user_normalizes_and_hashes() {
        let (factory, store) = factory();
        let hasher = fast_hasher();

        let user = factory
            .create_user(Some("a@B.COM"), Some("x"), ExtraFields::new())
            .unwrap();

        assert_eq!(user.email.as_ref(), "a@b.com");
        assert_ne!(user.identity.password.as_str(), "x");
        assert!(user.check_password("x", hasher.as_ref()).unwrap());
        assert!(user.is_active());
        assert!(!user.is_staff());
        assert!(!user.is_superuser());

        let stored = store.get_user_by_id(user.id).unwrap().unwrap();
        assert_eq!(stored, user);
    }

    #[test]
    fn test_create_user_without_password_is_unusable() {
        let (factory, _) = factory();
        let user = factory
            .create_user(Some("nopass@example.com"), None, ExtraFields::new())
            .unwrap();
        assert!(!user.has_usable_password());
    }

    #[test]
    fn test_create_user_applies_extra_fields() {
        let (factory, _) = factory();
        let extra = ExtraFields::new()
            .with("first_name", "Ada")
            .with("last_name", "Lovelace")
            .with("is_active", false);

        let user = factory
            .create_user(Some("ada@example.com"), Some("pw"), extra)
            .unwrap();
        assert_eq!(user.get_full_name(), "Ada Lovelace");
        assert!(!user.is_active());
    }

    #[test]
    fn test_create_user_rejects_bad_fields_before_saving() {
        let store = Arc::new(CountingStore::default());
        let hasher = Arc::new(CountingHasher::default());
        let factory = AccountFactory::new(store.clone(), hasher.clone());

        let cases = [
            ExtraFields::new().with("nickname", "ada"),
            ExtraFields::new().with("email", "other@example.com"),
            ExtraFields::new().with("first_name", "x".repeat(151)),
            ExtraFields::new().with("is_superuser", true),
        ];
        for extra in cases {
            assert!(factory
                .create_user(Some("ada@example.com"), Some("pw"), extra)
                .is_err());
        }
        assert_eq!(store.saves.load(Ordering::SeqCst), 0);
        assert_eq!(hasher.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_create_user_duplicate_email() {
        let (factory, store) = factory();
        factory
            .create_user(Some("ada@example.com"), None, ExtraFields::new())
            .unwrap();

        let err = factory
            .create_user(Some("ada@EXAMPLE.COM"), None, ExtraFields::new())
            .unwrap_err();
        assert!(err.is_duplicate_key());
        assert_eq!(store.count_users().unwrap(), 1);
    }

    #[test]
    fn test_create_superuser() {
        let (factory, _) = factory();
        let user = factory
            .create_superuser(Some("admin@x.com"), Some("x"), ExtraFields::new())
            .unwrap();
        assert!(user.is_staff());
        assert!(user.is_superuser());
        assert!(user.has_usable_password());
    }

    #[test]
    fn test_create_superuser_accepts_explicit_true() {
        let (factory, _) = factory();
        let extra = ExtraFields::new().with("is_staff", true).with("is_superuser", true);
        assert!(factory
            .create_superuser(Some("admin@x.com"), None, extra)
            .unwrap()
            .is_superuser());
    }

    #[test]
    fn test_create_superuser_rejects_false_flags_without_side_effects() {
        let store = Arc::new(CountingStore::default());
        let hasher = Arc::new(CountingHasher::default());
        let factory = AccountFactory::new(store.clone(), hasher.clone());

        let cases = [
            ExtraFields::new().with("is_staff", false),
            ExtraFields::new().with("is_superuser", false),
            ExtraFields::new().with("is_staff", "yes"),
        ];
        for extra in cases {
            let err = factory
                .create_superuser(Some("admin@x.com"), Some("x"), extra)
                .unwrap_err();
            assert!(matches!(err, Error::InvariantViolation(_)), "got {:?}", err);
        }
        assert_eq!(store.saves.load(Ordering::SeqCst), 0);
        assert_eq!(hasher.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_create_superuser_checks_email_after_flags() {
        let (factory, _) = factory();
        let err = factory
            .create_superuser(None, Some("x"), ExtraFields::new())
            .unwrap_err();
        assert!(matches!(err, Error::MissingField("email")));
    }
}
