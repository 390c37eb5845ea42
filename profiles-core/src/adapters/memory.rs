//! In-memory user store

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use uuid::Uuid;

use crate::domain::result::{Result, StoreError};
use crate::domain::{Email, User};
use crate::ports::UserStore;

/// Process-local user store, for tests and embedding.
///
/// Email uniqueness is checked and the write applied under one write lock,
/// so concurrent saves with the same email admit exactly one.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock cannot leave a half-written record:
    // every mutation is a single insert/remove.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<Uuid, User>> {
        self.users.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<Uuid, User>> {
        self.users.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl UserStore for InMemoryUserStore {
    fn save_user(&self, user: &User) -> Result<()> {
        let mut users = self.write();

        let taken = users
            .values()
            .any(|other| other.id != user.id && other.email == user.email);
        if taken {
            return Err(StoreError::DuplicateKey(format!("email: {}", user.email)).into());
        }
        if user.identity.is_superuser && !user.identity.is_staff {
            return Err(StoreError::Constraint("superuser must be staff".to_string()).into());
        }

        users.insert(user.id, user.clone());
        Ok(())
    }

    fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.read().get(&id).cloned())
    }

    fn get_user_by_email(&self, email: &Email) -> Result<Option<User>> {
        Ok(self.read().values().find(|u| &u.email == email).cloned())
    }

    fn list_users(&self) -> Result<Vec<User>> {
        let mut users: Vec<User> = self.read().values().cloned().collect();
        users.sort_by(|a, b| a.date_joined.cmp(&b.date_joined).then(a.id.cmp(&b.id)));
        Ok(users)
    }

    fn delete_user(&self, id: Uuid) -> Result<bool> {
        Ok(self.write().remove(&id).is_some())
    }

    fn count_users(&self) -> Result<u64> {
        Ok(self.read().len() as u64)
    }
}
