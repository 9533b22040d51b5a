//! Local account lifecycle: signup and password reset.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use super::ports::{AccountRegistration, CredentialStore, PasswordHasher, PasswordReset};
use super::store_support::{
    DEFAULT_STORE_TIMEOUT, map_hasher_error, map_store_error, with_store_deadline,
};
use super::{Error, PasswordResetRequest, SignupRequest, User, UserId};

const RESET_MISMATCH: &str = "name or email is incorrect";

/// Signup and password reset over a credential store.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn CredentialStore>,
    hasher: Arc<dyn PasswordHasher>,
    store_timeout: Duration,
}

impl AccountService {
    /// Build a service with the default store deadline.
    pub fn new(store: Arc<dyn CredentialStore>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self {
            store,
            hasher,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    /// Override the deadline applied to store calls.
    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }
}

#[async_trait]
impl AccountRegistration for AccountService {
    async fn sign_up(&self, request: &SignupRequest) -> Result<User, Error> {
        // Cheap early exit; the insert below is what actually guarantees
        // uniqueness.
        let existing = with_store_deadline(
            self.store_timeout,
            "find_by_email",
            self.store.find_by_email(request.email()),
        )
        .await
        .map_err(map_store_error)?;
        if existing.is_some() {
            debug!("signup rejected: email already registered");
            return Err(Error::conflict("email is already registered"));
        }

        let hash = self
            .hasher
            .hash(request.password())
            .await
            .map_err(map_hasher_error)?;
        let user = User::local(
            UserId::random(),
            request.name().clone(),
            request.email().clone(),
            hash,
        );

        with_store_deadline(self.store_timeout, "insert", self.store.insert(&user))
            .await
            .map_err(map_store_error)?;

        info!(user_id = %user.id(), "local account created");
        Ok(user)
    }
}

#[async_trait]
impl PasswordReset for AccountService {
    async fn reset_password(&self, request: &PasswordResetRequest) -> Result<(), Error> {
        let found = with_store_deadline(
            self.store_timeout,
            "find_by_email",
            self.store.find_by_email(request.email()),
        )
        .await
        .map_err(map_store_error)?;

        let Some(user) = found else {
            debug!("password reset rejected: account not found");
            return Err(Error::invalid_request(RESET_MISMATCH));
        };
        if user.name() != request.name() {
            debug!(user_id = %user.id(), "password reset rejected: name mismatch");
            return Err(Error::invalid_request(RESET_MISMATCH));
        }

        let replacement = self
            .hasher
            .hash(request.password())
            .await
            .map_err(map_hasher_error)?;

        with_store_deadline(
            self.store_timeout,
            "replace_password_hash",
            self.store
                .replace_password_hash(user.id(), user.password_hash().cloned(), replacement),
        )
        .await
        .map_err(map_store_error)?;

        info!(user_id = %user.id(), "password replaced");
        Ok(())
    }
}
