//! Shared validation helpers for inbound HTTP adapters.

use serde_json::json;

use crate::domain::{AuthValidationError, Error, UserValidationError};

/// Machine-readable validation codes surfaced in `details.code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValidationCode {
    Empty,
    TooLong,
    InvalidCharacters,
    InvalidFormat,
}

impl ValidationCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::TooLong => "too_long",
            Self::InvalidCharacters => "invalid_characters",
            Self::InvalidFormat => "invalid_format",
        }
    }
}

fn code_for(error: &AuthValidationError) -> ValidationCode {
    match error {
        AuthValidationError::EmptyEmail | AuthValidationError::EmptyPassword => {
            ValidationCode::Empty
        }
        AuthValidationError::PasswordTooLong { .. } => ValidationCode::TooLong,
        AuthValidationError::User(inner) => match inner {
            UserValidationError::EmptyName
            | UserValidationError::EmptyPasswordHash
            | UserValidationError::EmptyFederatedId
            | UserValidationError::MissingCredential => ValidationCode::Empty,
            UserValidationError::NameTooLong { .. }
            | UserValidationError::EmailTooLong { .. }
            | UserValidationError::FederatedIdTooLong { .. } => ValidationCode::TooLong,
            UserValidationError::NameInvalidCharacters => ValidationCode::InvalidCharacters,
            UserValidationError::InvalidId
            | UserValidationError::InvalidEmail
            | UserValidationError::InvalidThumbnail => ValidationCode::InvalidFormat,
        },
    }
}

/// Turn a payload validation failure into a `400` with field details.
pub(crate) fn invalid_payload(error: &AuthValidationError) -> Error {
    Error::invalid_request(error.to_string()).with_details(json!({
        "field": error.field(),
        "code": code_for(error).as_str(),
    }))
}
