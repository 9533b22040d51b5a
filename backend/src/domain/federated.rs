//! Federated identity verification.
//!
//! [`FederatedIdentityVerifier`] maps a trusted provider profile to exactly
//! one local user. The lookup is an optimisation; uniqueness comes from the
//! store's atomic insert. When a concurrent login wins the insert race the
//! verifier re-reads and returns the winner's record, so repeated or
//! concurrent logins by the same identity converge on one user id.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};
use url::Url;

use super::ports::{
    CredentialStore, CredentialStoreError, FederatedLoginService, IdentityField,
    IdentityProviderClient, IdentityProviderError,
};
use super::store_support::{DEFAULT_STORE_TIMEOUT, map_store_error, with_store_deadline};
use super::{AuthorizationCode, Error, FederatedProfile, OAuthState, User, UserId};

/// Find-or-create local users for provider identities.
#[derive(Clone)]
pub struct FederatedIdentityVerifier {
    store: Arc<dyn CredentialStore>,
    store_timeout: Duration,
}

impl FederatedIdentityVerifier {
    /// Build a verifier with the default store deadline.
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            store,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    /// Override the deadline applied to store calls.
    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    /// Return the user bound to `profile.federated_id`, creating it on first
    /// sight.
    ///
    /// An existing record is returned unchanged. A new record takes its
    /// name, email and thumbnail from the profile. If the profile's email
    /// already belongs to a different account the call fails with a
    /// conflict; accounts are never linked implicitly.
    pub async fn verify(&self, profile: &FederatedProfile) -> Result<User, Error> {
        if let Some(existing) = self.find(profile).await? {
            debug!(user_id = %existing.id(), "federated login matched existing account");
            return Ok(existing);
        }

        let candidate = User::federated(
            UserId::random(),
            profile.display_name.clone(),
            profile.federated_id.clone(),
            profile.email.clone(),
            profile.thumbnail.clone(),
        );

        let inserted = with_store_deadline(
            self.store_timeout,
            "insert",
            self.store.insert(&candidate),
        )
        .await;

        match inserted {
            Ok(()) => {
                info!(user_id = %candidate.id(), "federated account created");
                Ok(candidate)
            }
            Err(CredentialStoreError::Duplicate {
                field: IdentityField::FederatedId,
            }) => {
                debug!("federated account created concurrently; re-reading");
                self.find(profile).await?.ok_or_else(|| {
                    warn!("federated id reported duplicate but no record was found");
                    Error::service_unavailable("credential store unavailable")
                })
            }
            Err(CredentialStoreError::Duplicate {
                field: IdentityField::Email,
            }) => Err(Error::conflict(
                "email is already registered to another account",
            )),
            Err(other) => Err(map_store_error(other)),
        }
    }

    async fn find(&self, profile: &FederatedProfile) -> Result<Option<User>, Error> {
        with_store_deadline(
            self.store_timeout,
            "find_by_federated_id",
            self.store.find_by_federated_id(&profile.federated_id),
        )
        .await
        .map_err(map_store_error)
    }
}

/// [`FederatedLoginService`] composed of a provider client and the verifier.
#[derive(Clone)]
pub struct FederatedLoginFlow {
    provider: Arc<dyn IdentityProviderClient>,
    verifier: FederatedIdentityVerifier,
}

impl FederatedLoginFlow {
    /// Compose a flow.
    pub fn new(
        provider: Arc<dyn IdentityProviderClient>,
        verifier: FederatedIdentityVerifier,
    ) -> Self {
        Self { provider, verifier }
    }
}

fn map_provider_error(error: IdentityProviderError) -> Error {
    match error {
        IdentityProviderError::Rejected { message } => {
            debug!(%message, "identity provider rejected authorisation code");
            Error::unauthorized("identity provider rejected the login")
        }
        IdentityProviderError::Transport { message } => {
            warn!(%message, "identity provider unreachable");
            Error::service_unavailable("identity provider unavailable")
        }
        IdentityProviderError::Decode { message }
        | IdentityProviderError::InvalidProfile { message } => {
            warn!(%message, "identity provider returned an unusable profile");
            Error::internal(message)
        }
    }
}

#[async_trait]
impl FederatedLoginService for FederatedLoginFlow {
    fn authorization_url(&self, state: &OAuthState) -> Url {
        self.provider.authorization_url(state)
    }

    async fn complete(&self, code: &AuthorizationCode) -> Result<User, Error> {
        let profile = self
            .provider
            .exchange(code)
            .await
            .map_err(map_provider_error)?;
        self.verifier.verify(&profile).await
    }
}
