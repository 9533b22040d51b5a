//! Authentication inputs: credentials, signup and reset requests, federated
//! profiles and OAuth round-trip values.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use rand::RngCore;
use thiserror::Error;
use zeroize::Zeroizing;

use super::user::{
    DisplayName, EmailAddress, FederatedId, Thumbnail, UserValidationError,
};

/// Longest password accepted when one is set; bcrypt ignores bytes past 72.
pub const PASSWORD_MAX_BYTES: usize = 72;

/// Domain error returned when authentication payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthValidationError {
    /// Email was missing or blank once trimmed.
    #[error("email must not be empty")]
    EmptyEmail,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
    /// Password exceeded [`PASSWORD_MAX_BYTES`].
    #[error("password must be at most {max} bytes")]
    PasswordTooLong { max: usize },
    /// A user field failed validation.
    #[error(transparent)]
    User(#[from] UserValidationError),
}

impl AuthValidationError {
    /// Name of the payload field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyEmail => "email",
            Self::EmptyPassword | Self::PasswordTooLong { .. } => "password",
            Self::User(inner) => match inner {
                UserValidationError::EmptyName
                | UserValidationError::NameTooLong { .. }
                | UserValidationError::NameInvalidCharacters => "name",
                UserValidationError::InvalidEmail | UserValidationError::EmailTooLong { .. } => {
                    "email"
                }
                UserValidationError::EmptyFederatedId
                | UserValidationError::FederatedIdTooLong { .. } => "federatedId",
                UserValidationError::InvalidThumbnail => "thumbnail",
                UserValidationError::InvalidId
                | UserValidationError::EmptyPasswordHash
                | UserValidationError::MissingCredential => "user",
            },
        }
    }
}

/// Caller-supplied password, wiped from memory on drop.
///
/// Whitespace is preserved so credential comparisons are not surprising.
#[derive(Clone, PartialEq, Eq)]
pub struct PlaintextPassword(Zeroizing<String>);

impl PlaintextPassword {
    /// Accept any non-empty password.
    pub fn new(raw: &str) -> Result<Self, AuthValidationError> {
        if raw.is_empty() {
            return Err(AuthValidationError::EmptyPassword);
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    /// Accept a password that is about to be hashed and stored.
    pub fn new_for_storage(raw: &str) -> Result<Self, AuthValidationError> {
        let password = Self::new(raw)?;
        if raw.len() > PASSWORD_MAX_BYTES {
            return Err(AuthValidationError::PasswordTooLong {
                max: PASSWORD_MAX_BYTES,
            });
        }
        Ok(password)
    }

    /// Borrow the plaintext. Keep the borrow short.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PlaintextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PlaintextPassword(<redacted>)")
    }
}

/// Validated login credentials used by the local verifier.
///
/// ## Invariants
/// - `email` is trimmed and non-empty. It is not shape-checked here; a
///   malformed address simply never matches a stored account.
/// - `password` is non-empty.
///
/// # Examples
/// ```
/// use travel_auth::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" a@x.com ", "correct").unwrap();
/// assert_eq!(creds.email(), "a@x.com");
/// assert_eq!(creds.password().expose(), "correct");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: PlaintextPassword,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, AuthValidationError> {
        let normalized = email.trim();
        if normalized.is_empty() {
            return Err(AuthValidationError::EmptyEmail);
        }
        Ok(Self {
            email: normalized.to_owned(),
            password: PlaintextPassword::new(password)?,
        })
    }

    /// Email string used for the account lookup.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password provided by the caller.
    pub fn password(&self) -> &PlaintextPassword {
        &self.password
    }
}

/// Validated local signup request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupRequest {
    name: DisplayName,
    email: EmailAddress,
    password: PlaintextPassword,
}

impl SignupRequest {
    /// Validate raw signup fields.
    pub fn try_from_parts(
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Self, AuthValidationError> {
        Ok(Self {
            name: DisplayName::new(name)?,
            email: EmailAddress::new(email)?,
            password: PlaintextPassword::new_for_storage(password)?,
        })
    }

    /// Display name for the new account.
    pub fn name(&self) -> &DisplayName {
        &self.name
    }

    /// Login email for the new account.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password to hash.
    pub fn password(&self) -> &PlaintextPassword {
        &self.password
    }
}

/// Validated password reset request.
///
/// The account is located by email and must also match by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordResetRequest {
    name: DisplayName,
    email: EmailAddress,
    password: PlaintextPassword,
}

impl PasswordResetRequest {
    /// Validate raw reset fields.
    pub fn try_from_parts(
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Self, AuthValidationError> {
        Ok(Self {
            name: DisplayName::new(name)?,
            email: EmailAddress::new(email)?,
            password: PlaintextPassword::new_for_storage(password)?,
        })
    }

    /// Name the account must carry.
    pub fn name(&self) -> &DisplayName {
        &self.name
    }

    /// Email that locates the account.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Replacement password.
    pub fn password(&self) -> &PlaintextPassword {
        &self.password
    }
}

/// Profile asserted by a trusted identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederatedProfile {
    /// Provider subject identifier.
    pub federated_id: FederatedId,
    /// Display name from the provider.
    pub display_name: DisplayName,
    /// First email reported by the provider.
    pub email: Option<EmailAddress>,
    /// First photo reported by the provider.
    pub thumbnail: Option<Thumbnail>,
}

/// Random value binding an authorisation redirect to the browser session.
#[derive(Clone, PartialEq, Eq)]
pub struct OAuthState(String);

impl OAuthState {
    /// Generate 32 random bytes, hex encoded.
    pub fn generate() -> Self {
        let mut bytes = [0_u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// Wrap a state value echoed back by the provider.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Encoded state.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for OAuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OAuthState(<redacted>)")
    }
}

/// One-time authorisation code returned by the identity provider.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthorizationCode(Zeroizing<String>);

impl AuthorizationCode {
    /// Accept a non-empty code.
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| Self(Zeroizing::new(trimmed.to_owned())))
    }

    /// Borrow the code for the token exchange.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for AuthorizationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthorizationCode(<redacted>)")
    }
}
