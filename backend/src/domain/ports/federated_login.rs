//! Driving port for the federated login round trip.
use async_trait::async_trait;
use url::Url;

use crate::domain::{AuthorizationCode, Error, OAuthState, User};

/// Begin and complete a login through a third-party identity provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FederatedLoginService: Send + Sync {
    /// URL to redirect the browser to, bound to `state`.
    fn authorization_url(&self, state: &OAuthState) -> Url;

    /// Exchange `code` and return the matching local user, creating it on
    /// first login.
    async fn complete(&self, code: &AuthorizationCode) -> Result<User, Error>;
}
