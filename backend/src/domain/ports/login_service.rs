//! Driving port for local credential verification.
//!
//! Inbound adapters call it to authenticate credentials without knowing the
//! backing store or hasher, which keeps handler tests deterministic.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, User};

/// Outcome of a local verification.
///
/// "No such account" and "wrong password" both collapse to
/// [`VerifyResult::InvalidCredentials`]; only logs tell them apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyResult {
    Success(User),
    InvalidCredentials,
}

/// Domain use-case port for local authentication.
///
/// `Err` is reserved for infrastructure failures such as an unavailable
/// credential store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Verify an email/password pair.
    async fn verify(&self, credentials: &LoginCredentials) -> Result<VerifyResult, Error>;
}
