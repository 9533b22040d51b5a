//! Driving port mapping users to session tokens and back.
//!
//! A session moves `Unauthenticated -> Authenticated` when a token is
//! serialised after a successful verification, and back to
//! `Unauthenticated` on logout or when the token no longer resolves.

use async_trait::async_trait;

use crate::domain::{Error, User};

/// Compact reference to a user held by the session transport.
///
/// Carries the user id only; never a hash or profile data.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wrap a token read back from the session transport.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Token value to embed in the session.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Outcome of resolving a session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionResolution {
    /// The token refers to a live user.
    Authenticated(User),
    /// The token is malformed or its user no longer exists.
    NotFound,
}

/// Serialise users into session tokens and resolve them back.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionResolver: Send + Sync {
    /// Produce the token for `user`.
    fn serialize(&self, user: &User) -> SessionToken;

    /// Resolve `token` to the current user record.
    ///
    /// `Err` is reserved for infrastructure failures.
    async fn deserialize(&self, token: &SessionToken) -> Result<SessionResolution, Error>;
}
