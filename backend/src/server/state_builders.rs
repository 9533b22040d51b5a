//! Builders wiring domain services onto the configured adapters.

use std::sync::Arc;

use tracing::info;

use travel_auth::domain::ports::FederatedLoginService;
use travel_auth::domain::{
    AccountService, FederatedIdentityVerifier, FederatedLoginFlow, LocalCredentialVerifier,
    SessionIdentityManager,
};
use travel_auth::inbound::http::state::{HttpState, HttpStatePorts};
use travel_auth::outbound::identity::GoogleIdentityProvider;

use super::ServerConfig;

fn build_federated(config: &ServerConfig) -> std::io::Result<Option<Arc<dyn FederatedLoginService>>> {
    let Some(google) = config.google.clone() else {
        info!("google login disabled: no client credentials configured");
        return Ok(None);
    };
    let provider = GoogleIdentityProvider::new(google).map_err(|e| {
        std::io::Error::other(format!("failed to build identity provider client: {e}"))
    })?;
    let flow = FederatedLoginFlow::new(
        Arc::new(provider),
        FederatedIdentityVerifier::new(Arc::clone(&config.store))
            .with_store_timeout(config.store_timeout),
    );
    Ok(Some(Arc::new(flow)))
}

/// Build the handler state from the configured store and hasher.
///
/// # Errors
/// Returns [`std::io::Error`] when the identity provider client cannot be
/// constructed.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<HttpState> {
    let store = &config.store;
    let accounts = Arc::new(
        AccountService::new(Arc::clone(store), Arc::clone(&config.hasher))
            .with_store_timeout(config.store_timeout),
    );
    let state = HttpState::new(HttpStatePorts {
        login: Arc::new(
            LocalCredentialVerifier::new(Arc::clone(store), Arc::clone(&config.hasher))
                .with_store_timeout(config.store_timeout),
        ),
        registration: accounts.clone(),
        password_reset: accounts,
        sessions: Arc::new(
            SessionIdentityManager::new(Arc::clone(store)).with_store_timeout(config.store_timeout),
        ),
    });

    Ok(match build_federated(config)? {
        Some(federated) => state.with_federated(federated),
        None => state,
    })
}

#[cfg(test)]
mod tests {
    //! The configured store deadline reaches every service.

    use std::future::pending;
    use std::time::Duration;

    use actix_web::cookie::{Key, SameSite};
    use async_trait::async_trait;
    use travel_auth::domain::ports::{CredentialStore, CredentialStoreError};
    use travel_auth::domain::{
        DisplayName, EmailAddress, ErrorCode, FederatedId, LoginCredentials, PasswordHash, User,
        UserId,
    };
    use travel_auth::inbound::http::session_config::SessionSettings;
    use travel_auth::outbound::crypto::BcryptPasswordHasher;

    use super::*;

    /// Store whose calls never complete.
    struct StalledStore;

    #[async_trait]
    impl CredentialStore for StalledStore {
        async fn find_by_id(&self, _id: &UserId) -> Result<Option<User>, CredentialStoreError> {
            pending().await
        }

        async fn find_by_email(
            &self,
            _email: &EmailAddress,
        ) -> Result<Option<User>, CredentialStoreError> {
            pending().await
        }

        async fn find_by_federated_id(
            &self,
            _federated_id: &FederatedId,
        ) -> Result<Option<User>, CredentialStoreError> {
            pending().await
        }

        async fn insert(&self, _user: &User) -> Result<(), CredentialStoreError> {
            pending().await
        }

        async fn replace_password_hash(
            &self,
            _id: &UserId,
            _expected: Option<PasswordHash>,
            _replacement: PasswordHash,
        ) -> Result<(), CredentialStoreError> {
            pending().await
        }
    }

    fn config(store_timeout: Duration) -> ServerConfig {
        let session = SessionSettings {
            key: Key::generate(),
            cookie_secure: false,
            same_site: SameSite::Lax,
            ttl: actix_web::cookie::time::Duration::hours(1),
        };
        let hasher = BcryptPasswordHasher::new(4).expect("hasher");
        ServerConfig::new(
            session,
            "127.0.0.1:0".parse().expect("addr"),
            Arc::new(StalledStore),
            Arc::new(hasher),
        )
        .with_store_timeout(store_timeout)
    }

    #[tokio::test]
    async fn stalled_store_fails_login_within_the_configured_deadline() {
        let state = build_http_state(&config(Duration::from_millis(20))).expect("state");
        let credentials =
            LoginCredentials::try_from_parts("ada@example.com", "analytical").expect("credentials");

        let outcome = tokio::time::timeout(Duration::from_secs(2), state.login.verify(&credentials))
            .await
            .expect("deadline applied");
        let err = outcome.expect_err("store timed out");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }

    #[tokio::test]
    async fn stalled_store_fails_session_resolution_within_the_configured_deadline() {
        let state = build_http_state(&config(Duration::from_millis(20))).expect("state");
        let token = state.sessions.serialize(&User::federated(
            UserId::random(),
            DisplayName::new("Grace").expect("name"),
            FederatedId::new("google-1").expect("federated id"),
            None,
            None,
        ));

        let outcome =
            tokio::time::timeout(Duration::from_secs(2), state.sessions.deserialize(&token))
                .await
                .expect("deadline applied");
        let err = outcome.expect_err("store timed out");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }
}
