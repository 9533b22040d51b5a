//! In-memory `CredentialStore` for development and tests.
//!
//! All reads and writes take one mutex, so the unique checks and the insert
//! happen atomically, matching the database's constraint semantics.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{CredentialStore, CredentialStoreError, IdentityField};
use crate::domain::{EmailAddress, FederatedId, PasswordHash, User, UserId};

#[derive(Debug, Default)]
struct Records {
    by_id: HashMap<UserId, User>,
    by_email: HashMap<EmailAddress, UserId>,
    by_federated_id: HashMap<FederatedId, UserId>,
}

impl Records {
    fn lookup(&self, id: Option<&UserId>) -> Option<User> {
        id.and_then(|id| self.by_id.get(id)).cloned()
    }

    fn collision(&self, user: &User) -> Option<IdentityField> {
        if user
            .federated_id()
            .is_some_and(|fid| self.by_federated_id.contains_key(fid))
        {
            return Some(IdentityField::FederatedId);
        }
        if user
            .email()
            .is_some_and(|email| self.by_email.contains_key(email))
        {
            return Some(IdentityField::Email);
        }
        self.by_id
            .contains_key(user.id())
            .then_some(IdentityField::Id)
    }
}

/// Mutex-guarded map of users with email and federated-id indexes.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    records: Mutex<Records>,
}

impl InMemoryCredentialStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub fn len(&self) -> usize {
        self.lock().map(|records| records.by_id.len()).unwrap_or(0)
    }

    /// Whether the store holds no users.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Delete a user and its index entries. Returns whether it existed.
    pub fn remove(&self, id: &UserId) -> bool {
        let Ok(mut records) = self.lock() else {
            return false;
        };
        let Some(user) = records.by_id.remove(id) else {
            return false;
        };
        if let Some(email) = user.email() {
            records.by_email.remove(email);
        }
        if let Some(fid) = user.federated_id() {
            records.by_federated_id.remove(fid);
        }
        true
    }

    fn lock(&self) -> Result<MutexGuard<'_, Records>, CredentialStoreError> {
        self.records
            .lock()
            .map_err(|_| CredentialStoreError::query("in-memory credential store lock poisoned"))
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, CredentialStoreError> {
        Ok(self.lock()?.lookup(Some(id)))
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, CredentialStoreError> {
        let records = self.lock()?;
        Ok(records.lookup(records.by_email.get(email)))
    }

    async fn find_by_federated_id(
        &self,
        federated_id: &FederatedId,
    ) -> Result<Option<User>, CredentialStoreError> {
        let records = self.lock()?;
        Ok(records.lookup(records.by_federated_id.get(federated_id)))
    }

    async fn insert(&self, user: &User) -> Result<(), CredentialStoreError> {
        let mut records = self.lock()?;
        if let Some(field) = records.collision(user) {
            return Err(CredentialStoreError::duplicate(field));
        }
        if let Some(email) = user.email() {
            records.by_email.insert(email.clone(), *user.id());
        }
        if let Some(fid) = user.federated_id() {
            records.by_federated_id.insert(fid.clone(), *user.id());
        }
        records.by_id.insert(*user.id(), user.clone());
        Ok(())
    }

    async fn replace_password_hash(
        &self,
        id: &UserId,
        expected: Option<PasswordHash>,
        replacement: PasswordHash,
    ) -> Result<(), CredentialStoreError> {
        let mut records = self.lock()?;
        let Some(current) = records.by_id.get(id) else {
            return Err(CredentialStoreError::stale(*id));
        };
        if current.password_hash() != expected.as_ref() {
            return Err(CredentialStoreError::stale(*id));
        }
        let updated = current
            .with_password_hash(replacement)
            .map_err(|err| CredentialStoreError::query(err.to_string()))?;
        records.by_id.insert(*id, updated);
        Ok(())
    }
}
