//! Shared helpers for services that call the credential store.

use std::future::Future;
use std::time::Duration;

use tracing::{error, warn};

use super::Error;
use super::ports::{CredentialStoreError, PasswordHasherError};

/// Deadline applied to every credential store call made by the services.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Run a store call under `timeout`.
///
/// Elapse drops the pending future and is reported as a connection failure,
/// never as success.
pub(crate) async fn with_store_deadline<T, Fut>(
    timeout: Duration,
    operation: &'static str,
    fut: Fut,
) -> Result<T, CredentialStoreError>
where
    Fut: Future<Output = Result<T, CredentialStoreError>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => {
            warn!(
                operation,
                timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                "credential store call timed out"
            );
            Err(CredentialStoreError::connection(format!(
                "{operation} timed out after {}ms",
                timeout.as_millis()
            )))
        }
    }
}

/// Map store failures to domain errors.
///
/// Duplicates and lost compare-and-swaps are ordinary conflicts; connection
/// failures are surfaced as unavailability; anything else is internal.
pub(crate) fn map_store_error(error: CredentialStoreError) -> Error {
    match error {
        CredentialStoreError::Duplicate { field } => {
            Error::conflict(format!("{field} is already registered"))
        }
        CredentialStoreError::Stale { .. } => {
            Error::conflict("account changed concurrently, try again")
        }
        CredentialStoreError::Connection { message } => {
            warn!(%message, "credential store unavailable");
            Error::service_unavailable("credential store unavailable")
        }
        CredentialStoreError::Query { message } => {
            error!(%message, "credential store query failed");
            Error::internal(format!("credential store error: {message}"))
        }
    }
}

/// Map hasher failures to domain errors.
pub(crate) fn map_hasher_error(error: PasswordHasherError) -> Error {
    error!(error = %error, "password hasher failed");
    Error::internal(error.to_string())
}
