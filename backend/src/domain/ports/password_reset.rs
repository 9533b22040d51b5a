//! Driving port for replacing a local password.
use async_trait::async_trait;

use crate::domain::{Error, PasswordResetRequest};

/// Replace the password of an account identified by name and email.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordReset: Send + Sync {
    /// Install a new password hash.
    async fn reset_password(&self, request: &PasswordResetRequest) -> Result<(), Error>;
}
