//! bcrypt-backed `PasswordHasher`.
//!
//! bcrypt is deliberately slow, so every call runs on Tokio's blocking pool
//! and the request task only awaits the result.

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{PasswordHasher, PasswordHasherError};
use crate::domain::{PasswordHash, PlaintextPassword};

/// Work factor used unless configured otherwise.
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// Errors raised when configuring the hasher.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BcryptHasherError {
    /// Cost outside the range bcrypt accepts.
    #[error("bcrypt cost must be between {min} and {max}, got {cost}")]
    InvalidCost { cost: u32, min: u32, max: u32 },
}

/// Salted bcrypt hasher with a fixed work factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    const MIN_COST: u32 = 4;
    const MAX_COST: u32 = 31;

    /// Build a hasher with `cost` rounds (log2).
    ///
    /// # Examples
    /// ```
    /// use travel_auth::outbound::crypto::BcryptPasswordHasher;
    ///
    /// assert!(BcryptPasswordHasher::new(12).is_ok());
    /// assert!(BcryptPasswordHasher::new(3).is_err());
    /// ```
    pub fn new(cost: u32) -> Result<Self, BcryptHasherError> {
        if !(Self::MIN_COST..=Self::MAX_COST).contains(&cost) {
            return Err(BcryptHasherError::InvalidCost {
                cost,
                min: Self::MIN_COST,
                max: Self::MAX_COST,
            });
        }
        Ok(Self { cost })
    }

    /// Configured work factor.
    pub fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self {
            cost: DEFAULT_BCRYPT_COST,
        }
    }
}

fn worker_error(error: tokio::task::JoinError) -> PasswordHasherError {
    PasswordHasherError::worker(error.to_string())
}

#[async_trait]
impl PasswordHasher for BcryptPasswordHasher {
    async fn hash(&self, password: &PlaintextPassword) -> Result<PasswordHash, PasswordHasherError> {
        let password = password.clone();
        let cost = self.cost;
        let encoded = tokio::task::spawn_blocking(move || bcrypt::hash(password.expose(), cost))
            .await
            .map_err(worker_error)?
            .map_err(|err| PasswordHasherError::hashing(err.to_string()))?;
        PasswordHash::from_encoded(encoded)
            .map_err(|err| PasswordHasherError::hashing(err.to_string()))
    }

    async fn verify(
        &self,
        password: &PlaintextPassword,
        hash: &PasswordHash,
    ) -> Result<bool, PasswordHasherError> {
        let password = password.clone();
        let hash = hash.clone();
        let outcome =
            tokio::task::spawn_blocking(move || bcrypt::verify(password.expose(), hash.as_encoded()))
                .await
                .map_err(worker_error)?;
        match outcome {
            Ok(matches) => Ok(matches),
            Err(err) => {
                debug!(error = %err, "stored hash is not valid bcrypt; treating as mismatch");
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn hasher() -> BcryptPasswordHasher {
        BcryptPasswordHasher::new(4).expect("minimum cost")
    }

    fn password(raw: &str) -> PlaintextPassword {
        PlaintextPassword::new(raw).expect("password")
    }

    #[rstest]
    #[case(3, false)]
    #[case(4, true)]
    #[case(12, true)]
    #[case(31, true)]
    #[case(32, false)]
    fn cost_range_is_enforced(#[case] cost: u32, #[case] ok: bool) {
        assert_eq!(BcryptPasswordHasher::new(cost).is_ok(), ok);
    }

    #[test]
    fn default_cost_is_twelve() {
        assert_eq!(BcryptPasswordHasher::default().cost(), 12);
    }

    #[rstest]
    #[tokio::test]
    async fn hash_then_verify_round_trips(hasher: BcryptPasswordHasher) {
        let secret = password("correct horse battery staple");
        let hash = hasher.hash(&secret).await.expect("hash");
        assert!(hasher.verify(&secret, &hash).await.expect("verify"));
        assert!(!hasher.verify(&password("wrong"), &hash).await.expect("verify"));
    }

    #[rstest]
    #[tokio::test]
    async fn hashes_are_salted(hasher: BcryptPasswordHasher) {
        let secret = password("same input");
        let first = hasher.hash(&secret).await.expect("hash");
        let second = hasher.hash(&secret).await.expect("hash");
        assert_ne!(first, second);
        assert!(hasher.verify(&secret, &second).await.expect("verify"));
    }

    #[rstest]
    #[tokio::test]
    async fn hash_encodes_the_work_factor(hasher: BcryptPasswordHasher) {
        let hash = hasher.hash(&password("pw")).await.expect("hash");
        assert!(hash.as_encoded().starts_with("$2b$04$"));
    }

    #[rstest]
    #[tokio::test]
    async fn malformed_hash_is_a_mismatch(hasher: BcryptPasswordHasher) {
        let garbage = PasswordHash::from_encoded("not-a-bcrypt-hash").expect("hash");
        assert!(!hasher.verify(&password("pw"), &garbage).await.expect("verify"));
    }
}
