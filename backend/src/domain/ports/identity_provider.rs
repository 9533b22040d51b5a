//! Port for third-party identity provider clients.
//!
//! The client owns the provider round trip: it builds the authorisation
//! redirect and turns the returned code into a trusted [`FederatedProfile`].
//! Assertion integrity is the client's job; the domain trusts what it returns.

use async_trait::async_trait;
use url::Url;

use crate::domain::{AuthorizationCode, FederatedProfile, OAuthState};

use super::define_port_error;

define_port_error! {
    /// Errors raised by identity provider adapters.
    pub enum IdentityProviderError {
        /// Provider refused the code or credentials.
        Rejected { message: String } => "identity provider rejected the request: {message}",
        /// Provider could not be reached or timed out.
        Transport { message: String } => "identity provider transport failed: {message}",
        /// Provider response could not be decoded.
        Decode { message: String } => "identity provider response was malformed: {message}",
        /// Decoded profile lacks required fields.
        InvalidProfile { message: String } => "identity provider profile is invalid: {message}",
    }
}

/// Client for a single OAuth 2.0 / OpenID Connect identity provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProviderClient: Send + Sync {
    /// Authorisation URL the browser is redirected to.
    fn authorization_url(&self, state: &OAuthState) -> Url;

    /// Exchange an authorisation code for the user's profile.
    async fn exchange(
        &self,
        code: &AuthorizationCode,
    ) -> Result<FederatedProfile, IdentityProviderError>;
}
