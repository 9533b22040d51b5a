//! Access gate separating public from authenticated-only operations.
//!
//! `check` only reads: it never writes to the session or the store. Callers
//! turn [`Access::Deny`] into a redirect to the login entry point.

use std::sync::Arc;

use tracing::debug;

use super::Error;
use super::User;
use super::ports::{SessionResolution, SessionResolver, SessionToken};

/// Gate decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Allow(User),
    Deny,
}

/// Resolves the session token attached to a request.
#[derive(Clone)]
pub struct AccessGate {
    sessions: Arc<dyn SessionResolver>,
}

impl AccessGate {
    /// Build a gate over a session resolver.
    pub fn new(sessions: Arc<dyn SessionResolver>) -> Self {
        Self { sessions }
    }

    /// Decide whether a request carrying `token` may proceed.
    ///
    /// A missing or unresolvable token denies. `Err` means the decision
    /// could not be made, e.g. the credential store is unavailable.
    pub async fn check(&self, token: Option<&SessionToken>) -> Result<Access, Error> {
        let Some(token) = token else {
            debug!("access denied: no session");
            return Ok(Access::Deny);
        };
        match self.sessions.deserialize(token).await? {
            SessionResolution::Authenticated(user) => Ok(Access::Allow(user)),
            SessionResolution::NotFound => {
                debug!("access denied: session does not resolve");
                Ok(Access::Deny)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::MockSessionResolver;
    use crate::domain::{DisplayName, ErrorCode, FederatedId, UserId};

    fn user() -> User {
        User::federated(
            UserId::random(),
            DisplayName::new("Grace").expect("name"),
            FederatedId::new("google-1").expect("fid"),
            None,
            None,
        )
    }

    #[tokio::test]
    async fn missing_token_is_denied() {
        let mut sessions = MockSessionResolver::new();
        sessions.expect_deserialize().never();
        let gate = AccessGate::new(Arc::new(sessions));
        assert_eq!(gate.check(None).await, Ok(Access::Deny));
    }

    #[tokio::test]
    async fn resolving_token_is_allowed() {
        let expected = user();
        let resolved = expected.clone();
        let mut sessions = MockSessionResolver::new();
        sessions
            .expect_deserialize()
            .returning(move |_| Ok(SessionResolution::Authenticated(resolved.clone())));
        let gate = AccessGate::new(Arc::new(sessions));

        let token = SessionToken::from_raw(expected.id().to_string());
        assert_eq!(gate.check(Some(&token)).await, Ok(Access::Allow(expected)));
    }

    #[tokio::test]
    async fn stale_token_is_denied() {
        let mut sessions = MockSessionResolver::new();
        sessions
            .expect_deserialize()
            .returning(|_| Ok(SessionResolution::NotFound));
        let gate = AccessGate::new(Arc::new(sessions));

        let token = SessionToken::from_raw(UserId::random().to_string());
        assert_eq!(gate.check(Some(&token)).await, Ok(Access::Deny));
    }

    #[tokio::test]
    async fn resolver_failure_propagates() {
        let mut sessions = MockSessionResolver::new();
        sessions
            .expect_deserialize()
            .returning(|_| Err(Error::service_unavailable("credential store unavailable")));
        let gate = AccessGate::new(Arc::new(sessions));

        let token = SessionToken::from_raw(UserId::random().to_string());
        let err = gate.check(Some(&token)).await.expect_err("failure");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }
}
