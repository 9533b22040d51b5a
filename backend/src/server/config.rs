//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use travel_auth::domain::DEFAULT_STORE_TIMEOUT;
use travel_auth::domain::ports::{CredentialStore, PasswordHasher};
use travel_auth::inbound::http::session_config::SessionSettings;
use travel_auth::outbound::identity::GoogleOAuthConfig;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) login_path: String,
    pub(crate) store: Arc<dyn CredentialStore>,
    pub(crate) hasher: Arc<dyn PasswordHasher>,
    pub(crate) google: Option<GoogleOAuthConfig>,
    pub(crate) store_timeout: Duration,
}

impl ServerConfig {
    /// Configuration for local accounts only.
    #[must_use]
    pub fn new(
        session: SessionSettings,
        bind_addr: SocketAddr,
        store: Arc<dyn CredentialStore>,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            session,
            bind_addr,
            login_path: "/login".to_owned(),
            store,
            hasher,
            google: None,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    /// Page unauthenticated browsers are redirected to.
    #[must_use]
    pub fn with_login_path(mut self, login_path: impl Into<String>) -> Self {
        self.login_path = login_path.into();
        self
    }

    /// Deadline applied by the services to each credential store call.
    #[must_use]
    pub const fn with_store_timeout(mut self, store_timeout: Duration) -> Self {
        self.store_timeout = store_timeout;
        self
    }

    /// Enable Google login.
    #[must_use]
    pub fn with_google(mut self, google: Option<GoogleOAuthConfig>) -> Self {
        self.google = google;
        self
    }
}
