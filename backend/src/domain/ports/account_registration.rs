//! Driving port for local account signup.
use async_trait::async_trait;

use crate::domain::{Error, SignupRequest, User};

/// Create local accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRegistration: Send + Sync {
    /// Register a new local account.
    ///
    /// A taken email yields [`crate::domain::ErrorCode::Conflict`] and leaves
    /// the existing account untouched.
    async fn sign_up(&self, request: &SignupRequest) -> Result<User, Error>;
}
