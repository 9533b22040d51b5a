//! Local credential verification.
//!
//! Looks the account up by exact email and checks the password against the
//! stored hash. Every negative outcome, including a malformed email or an
//! account without a local password, becomes
//! [`VerifyResult::InvalidCredentials`]; the reason is logged at `debug`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::ports::{CredentialStore, LoginService, PasswordHasher, VerifyResult};
use super::store_support::{
    DEFAULT_STORE_TIMEOUT, map_hasher_error, map_store_error, with_store_deadline,
};
use super::{EmailAddress, Error, LoginCredentials};

/// [`LoginService`] backed by a credential store and a password hasher.
#[derive(Clone)]
pub struct LocalCredentialVerifier {
    store: Arc<dyn CredentialStore>,
    hasher: Arc<dyn PasswordHasher>,
    store_timeout: Duration,
}

impl LocalCredentialVerifier {
    /// Build a verifier with the default store deadline.
    pub fn new(store: Arc<dyn CredentialStore>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self {
            store,
            hasher,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    /// Override the deadline applied to store lookups.
    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }
}

#[async_trait]
impl LoginService for LocalCredentialVerifier {
    async fn verify(&self, credentials: &LoginCredentials) -> Result<VerifyResult, Error> {
        let Ok(email) = EmailAddress::new(credentials.email()) else {
            debug!("login rejected: malformed email");
            return Ok(VerifyResult::InvalidCredentials);
        };

        let found = with_store_deadline(
            self.store_timeout,
            "find_by_email",
            self.store.find_by_email(&email),
        )
        .await
        .map_err(map_store_error)?;

        let Some(user) = found else {
            debug!("login rejected: account not found");
            return Ok(VerifyResult::InvalidCredentials);
        };

        let Some(hash) = user.password_hash() else {
            debug!(user_id = %user.id(), "login rejected: account has no local password");
            return Ok(VerifyResult::InvalidCredentials);
        };

        let matches = self
            .hasher
            .verify(credentials.password(), hash)
            .await
            .map_err(map_hasher_error)?;

        if matches {
            debug!(user_id = %user.id(), "login accepted");
            Ok(VerifyResult::Success(user))
        } else {
            debug!(user_id = %user.id(), "login rejected: password mismatch");
            Ok(VerifyResult::InvalidCredentials)
        }
    }
}
