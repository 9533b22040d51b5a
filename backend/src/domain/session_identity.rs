//! Session identity manager.
//!
//! Tokens hold the user id and nothing else. Resolution re-reads the record
//! on every call, so a deleted account stops resolving immediately.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::ports::{CredentialStore, SessionResolution, SessionResolver, SessionToken};
use super::store_support::{DEFAULT_STORE_TIMEOUT, map_store_error, with_store_deadline};
use super::{Error, User, UserId};

/// [`SessionResolver`] backed by the credential store.
#[derive(Clone)]
pub struct SessionIdentityManager {
    store: Arc<dyn CredentialStore>,
    store_timeout: Duration,
}

impl SessionIdentityManager {
    /// Build a manager with the default store deadline.
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            store,
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
impl SessionResolver for SessionIdentityManager {
    fn serialize(&self, user: &User) -> SessionToken {
        SessionToken::from_raw(user.id().to_string())
    }

    async fn deserialize(&self, token: &SessionToken) -> Result<SessionResolution, Error> {
        let Ok(id) = UserId::new(token.as_str()) else {
            debug!("session token is not a user id");
            return Ok(SessionResolution::NotFound);
        };

        let found = with_store_deadline(
            self.store_timeout,
            "find_by_id",
            self.store.find_by_id(&id),
        )
        .await
        .map_err(map_store_error)?;

        Ok(match found {
            Some(user) => SessionResolution::Authenticated(user),
            None => {
                debug!(user_id = %id, "session refers to a missing account");
                SessionResolution::NotFound
            }
        })
    }
}
