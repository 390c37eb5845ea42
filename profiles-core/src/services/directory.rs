//! Directory service - lookups and maintenance on existing accounts

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{Email, PasswordHashable, User};
use crate::ports::{PasswordHasher, Persistable, UserStore};

/// Listing view of an account; never carries the credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub has_usable_password: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.to_string(),
            full_name: user.get_full_name(),
            is_active: user.is_active(),
            is_staff: user.is_staff(),
            is_superuser: user.is_superuser(),
            has_usable_password: user.has_usable_password(),
            date_joined: user.date_joined,
            last_login: user.identity.last_login,
        }
    }
}

pub struct DirectoryService {
    store: Arc<dyn UserStore>,
    hasher: Arc<dyn PasswordHasher>,
}

impl DirectoryService {
    pub fn new(store: Arc<dyn UserStore>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { store, hasher }
    }

    /// Look up an account by email, normalizing the input first
    pub fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = Email::parse(Some(email))?;
        self.store.get_user_by_email(&email)
    }

    /// Like `find_by_email`, but a missing account is an error
    pub fn get_by_email(&self, email: &str) -> Result<User> {
        self.find_by_email(email)?
            .ok_or_else(|| Error::not_found(format!("no account with email {}", email.trim())))
    }

    /// All accounts, oldest first
    pub fn list_users(&self) -> Result<Vec<UserSummary>> {
        Ok(self.store.list_users()?.iter().map(UserSummary::from).collect())
    }

    pub fn count(&self) -> Result<u64> {
        self.store.count_users()
    }

    /// Replace the password; `None` makes it unusable
    pub fn change_password(&self, email: &str, password: Option<&str>) -> Result<User> {
        let mut user = self.get_by_email(email)?;
        user.set_password(password, self.hasher.as_ref())?;
        user.save(self.store.as_ref())?;
        tracing::info!(user_id = %user.id, usable = user.has_usable_password(), "password changed");
        Ok(user)
    }

    /// Check a password against the stored credential
    pub fn check_password(&self, email: &str, password: &str) -> Result<bool> {
        let user = self.get_by_email(email)?;
        user.check_password(password, self.hasher.as_ref())
    }

    /// Mark the account inactive. Idempotent.
    pub fn deactivate(&self, email: &str) -> Result<User> {
        let mut user = self.get_by_email(email)?;
        if user.identity.is_active {
            user.identity.is_active = false;
            user.save(self.store.as_ref())?;
            tracing::info!(user_id = %user.id, "account deactivated");
        }
        Ok(user)
    }

    /// Remove the account; returns the id it had
    pub fn delete_by_email(&self, email: &str) -> Result<Uuid> {
        let user = self.get_by_email(email)?;
        if !self.store.delete_user(user.id)? {
            return Err(Error::not_found(format!("account {} vanished", user.id)));
        }
        tracing::info!(user_id = %user.id, "account deleted");
        Ok(user.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::argon2::Argon2Hasher;
    use crate::adapters::memory::InMemoryUserStore;
    use crate::domain::{Argon2Params, ExtraFields};
    use crate::services::AccountFactory;

    fn setup() -> (AccountFactory, DirectoryService) {
        let store = Arc::new(InMemoryUserStore::new());
        let hasher = Arc::new(Argon2Hasher::new(Argon2Params {
            time_cost: 1,
            memory_cost: 256,
            parallelism: 1,
            hash_len: 32,
        }));
        (
            AccountFactory::new(store.clone(), hasher.clone()),
            DirectoryService::new(store, hasher),
        )
    }

    #[test]
    fn test_find_by_email_normalizes() {
        let (factory, directory) = setup();
        let created = factory
            .create_user(Some("ada@example.com"), None, ExtraFields::new())
            .unwrap();

        let found = directory.find_by_email(" ada@EXAMPLE.com").unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert!(directory.find_by_email("bob@example.com").unwrap().is_none());
        assert!(matches!(
            directory.get_by_email("bob@example.com"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_list_and_count() {
        let (factory, directory) = setup();
        factory
            .create_user(
                Some("ada@example.com"),
                Some("pw"),
                ExtraFields::new().with("first_name", "Ada"),
            )
            .unwrap();
        factory
            .create_superuser(Some("root@example.com"), None, ExtraFields::new())
            .unwrap();

        let users = directory.list_users().unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(directory.count().unwrap(), 2);

        let ada = users.iter().find(|u| u.email == "ada@example.com").unwrap();
        assert_eq!(ada.full_name, "Ada");
        assert!(ada.has_usable_password);

        let json = serde_json::to_value(ada).unwrap();
        assert!(json.get("password").is_none());
    }

    #[test]
    fn test_change_password() {
        let (factory, directory) = setup();
        factory
            .create_user(Some("ada@example.com"), Some("old"), ExtraFields::new())
            .unwrap();

        directory.change_password("ada@example.com", Some("new")).unwrap();
        assert!(directory.check_password("ada@example.com", "new").unwrap());
        assert!(!directory.check_password("ada@example.com", "old").unwrap());

        let user = directory.change_password("ada@example.com", None).unwrap();
        assert!(!user.has_usable_password());
        assert!(!directory.check_password("ada@example.com", "new").unwrap());
    }

    #[test]
    fn test_deactivate_and_delete() {
        let (factory, directory) = setup();
        let created = factory
            .create_user(Some("ada@example.com"), None, ExtraFields::new())
            .unwrap();

        assert!(!directory.deactivate("ada@example.com").unwrap().is_active());
        assert!(!directory.deactivate("ada@example.com").unwrap().is_active());

        assert_eq!(directory.delete_by_email("ada@example.com").unwrap(), created.id);
        assert_eq!(directory.count().unwrap(), 0);
        assert!(matches!(
            directory.delete_by_email("ada@example.com"),
            Err(Error::NotFound(_))
        ));
    }
}
