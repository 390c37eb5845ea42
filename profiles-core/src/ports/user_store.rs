//! User store port - persistence abstraction

use uuid::Uuid;

use crate::domain::result::Result;
use crate::domain::{Email, User};

/// Storage collaborator for account records.
///
/// Implementations own durability and email uniqueness: writing a record
/// whose email already belongs to another record fails with
/// `StoreError::DuplicateKey`.
pub trait UserStore: Send + Sync {
    /// Insert a new record, or update the record with the same id
    fn save_user(&self, user: &User) -> Result<()>;

    fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// Look up by normalized email
    fn get_user_by_email(&self, email: &Email) -> Result<Option<User>>;

    /// All records, oldest first
    fn list_users(&self) -> Result<Vec<User>>;

    /// Remove a record; returns whether one existed
    fn delete_user(&self, id: Uuid) -> Result<bool>;

    fn count_users(&self) -> Result<u64>;
}

/// Capability of records that can be written to a user store
pub trait Persistable {
    fn save(&self, store: &dyn UserStore) -> Result<()>;
}

impl Persistable for User {
    fn save(&self, store: &dyn UserStore) -> Result<()> {
        store.save_user(self)
    }
}
