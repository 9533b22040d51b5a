//! Port abstraction for the credential store and its errors.
//!
//! The store is shared by every request. Uniqueness of `email` and
//! `federated_id` is enforced here, atomically, rather than by a
//! check-then-insert in the services: `insert` either stores the record or
//! reports [`CredentialStoreError::Duplicate`].

use std::fmt;

use async_trait::async_trait;

use crate::domain::{EmailAddress, FederatedId, PasswordHash, User, UserId};

use super::define_port_error;

/// Unique attribute that collided on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentityField {
    Id,
    Email,
    FederatedId,
}

impl fmt::Display for IdentityField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id => f.write_str("id"),
            Self::Email => f.write_str("email"),
            Self::FederatedId => f.write_str("federated id"),
        }
    }
}

define_port_error! {
    /// Persistence errors raised by credential store adapters.
    pub enum CredentialStoreError {
        /// Store connection could not be established or timed out.
        Connection { message: String } => "credential store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "credential store query failed: {message}",
        /// A unique attribute is already taken by another record.
        Duplicate { field: IdentityField } => "credential store already holds this {field}",
        /// Compare-and-swap lost: the record changed since it was read.
        Stale { id: UserId } => "credential record {id} changed concurrently",
    }
}

/// Port for reading and writing user identity records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, CredentialStoreError>;

    /// Fetch a user by exact email match.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, CredentialStoreError>;

    /// Fetch a user by identity-provider subject.
    async fn find_by_federated_id(
        &self,
        federated_id: &FederatedId,
    ) -> Result<Option<User>, CredentialStoreError>;

    /// Insert a new record if none of its unique attributes are taken.
    ///
    /// Never overwrites. A collision yields
    /// [`CredentialStoreError::Duplicate`] and leaves the store unchanged.
    async fn insert(&self, user: &User) -> Result<(), CredentialStoreError>;

    /// Replace the password hash of `id` only if it still equals `expected`.
    ///
    /// `expected == None` matches a record that has no password yet. A
    /// mismatch, or a missing record, yields [`CredentialStoreError::Stale`].
    async fn replace_password_hash(
        &self,
        id: &UserId,
        expected: Option<PasswordHash>,
        replacement: PasswordHash,
    ) -> Result<(), CredentialStoreError>;
}
