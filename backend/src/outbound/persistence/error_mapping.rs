//! Diesel and pool error mapping for the credential store.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::{CredentialStoreError, IdentityField};

use super::pool::PoolError;

/// Map pool failures to connection errors.
pub(super) fn map_pool_error(error: PoolError) -> CredentialStoreError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            CredentialStoreError::connection(message)
        }
    }
}

/// Resolve a unique-constraint name to the attribute it guards.
pub(super) fn field_for_constraint(constraint: Option<&str>) -> Option<IdentityField> {
    match constraint? {
        "users_pkey" => Some(IdentityField::Id),
        "users_email_key" => Some(IdentityField::Email),
        "users_federated_id_key" => Some(IdentityField::FederatedId),
        _ => None,
    }
}

/// Map Diesel errors to credential store errors.
///
/// Messages are generic; driver details are logged at `debug` only.
pub(super) fn map_diesel_error(error: DieselError) -> CredentialStoreError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            match field_for_constraint(info.constraint_name()) {
                Some(field) => CredentialStoreError::duplicate(field),
                None => CredentialStoreError::query("unique constraint violated"),
            }
        }
        DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection | DatabaseErrorKind::UnableToSendCommand,
            _,
        ) => CredentialStoreError::connection("database connection error"),
        DieselError::NotFound => CredentialStoreError::query("record not found"),
        DieselError::QueryBuilderError(_) => CredentialStoreError::query("database query error"),
        _ => CredentialStoreError::query("database error"),
    }
}
