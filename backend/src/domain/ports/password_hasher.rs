//! Port for one-way salted password hashing.
use async_trait::async_trait;

use crate::domain::{PasswordHash, PlaintextPassword};

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hashing adapters.
    ///
    /// A wrong password is not an error: `verify` answers `Ok(false)`.
    pub enum PasswordHasherError {
        /// Hash computation failed.
        Hashing { message: String } => "password hashing failed: {message}",
        /// The worker running the computation did not complete.
        Worker { message: String } => "password hashing worker failed: {message}",
    }
}

/// Cost-parameterised salted hasher.
///
/// Implementations must salt every call, so hashing the same plaintext twice
/// yields different encodings that both verify.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Hash `password` with a fresh random salt.
    async fn hash(&self, password: &PlaintextPassword) -> Result<PasswordHash, PasswordHasherError>;

    /// Check `password` against `hash`.
    ///
    /// Returns `Ok(false)` on mismatch and on hashes it cannot parse.
    async fn verify(
        &self,
        password: &PlaintextPassword,
        hash: &PasswordHash,
    ) -> Result<bool, PasswordHasherError>;
}
