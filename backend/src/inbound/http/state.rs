//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only depend
//! on domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AccountRegistration, FederatedLoginService, LoginService, PasswordReset, SessionResolver,
};

/// Parameter object bundling the port implementations handlers need.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub registration: Arc<dyn AccountRegistration>,
    pub password_reset: Arc<dyn PasswordReset>,
    pub sessions: Arc<dyn SessionResolver>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub registration: Arc<dyn AccountRegistration>,
    pub password_reset: Arc<dyn PasswordReset>,
    pub sessions: Arc<dyn SessionResolver>,
    /// Present only when an identity provider is configured.
    pub federated: Option<Arc<dyn FederatedLoginService>>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state without federated login.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use travel_auth::domain::{AccountService, LocalCredentialVerifier, SessionIdentityManager};
    /// use travel_auth::inbound::http::state::{HttpState, HttpStatePorts};
    /// use travel_auth::outbound::crypto::BcryptPasswordHasher;
    /// use travel_auth::outbound::memory::InMemoryCredentialStore;
    ///
    /// let store = Arc::new(InMemoryCredentialStore::new());
    /// let hasher = Arc::new(BcryptPasswordHasher::default());
    /// let accounts = Arc::new(AccountService::new(store.clone(), hasher.clone()));
    /// let state = HttpState::new(HttpStatePorts {
    ///     login: Arc::new(LocalCredentialVerifier::new(store.clone(), hasher)),
    ///     registration: accounts.clone(),
    ///     password_reset: accounts,
    ///     sessions: Arc::new(SessionIdentityManager::new(store)),
    /// });
    /// assert!(state.federated.is_none());
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            login,
            registration,
            password_reset,
            sessions,
        } = ports;
        Self {
            login,
            registration,
            password_reset,
            sessions,
            federated: None,
        }
    }

    /// Enable the federated login endpoints.
    #[must_use]
    pub fn with_federated(mut self, federated: Arc<dyn FederatedLoginService>) -> Self {
        self.federated = Some(federated);
        self
    }
}
