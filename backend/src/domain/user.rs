//! User identity record and its value types.
//!
//! A [`User`] is either a local account (it carries a [`PasswordHash`]), a
//! federated account (it carries a [`FederatedId`]), or both once a federated
//! user has set a local password. Constructors make the "no credential at
//! all" state unrepresentable.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;
use uuid::Uuid;

/// Validation errors raised by the user value types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserValidationError {
    /// Identifier was not a UUID.
    #[error("user id must be a valid UUID")]
    InvalidId,
    /// Display name was blank.
    #[error("name must not be empty")]
    EmptyName,
    /// Display name exceeded [`DISPLAY_NAME_MAX`] characters.
    #[error("name must be at most {max} characters")]
    NameTooLong { max: usize },
    /// Display name contained control characters.
    #[error("name must not contain control characters")]
    NameInvalidCharacters,
    /// Email address did not look like `local@domain.tld`.
    #[error("email must be a valid address")]
    InvalidEmail,
    /// Email address exceeded [`EMAIL_MAX`] characters.
    #[error("email must be at most {max} characters")]
    EmailTooLong { max: usize },
    /// Stored password hash was empty.
    #[error("password hash must not be empty")]
    EmptyPasswordHash,
    /// Federated identifier was blank.
    #[error("federated id must not be empty")]
    EmptyFederatedId,
    /// Federated identifier exceeded [`FEDERATED_ID_MAX`] characters.
    #[error("federated id must be at most {max} characters")]
    FederatedIdTooLong { max: usize },
    /// Thumbnail was not an absolute URL.
    #[error("thumbnail must be an absolute URL")]
    InvalidThumbnail,
    /// Neither a password hash nor a federated id was supplied.
    #[error("user must have a password hash or a federated id")]
    MissingCredential,
}

/// Stable user identifier, assigned at creation and never changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid);

impl UserId {
    /// Parse an identifier from its canonical string form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.trim() != raw {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an identifier read back from storage.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Maximum allowed length for a display name.
pub const DISPLAY_NAME_MAX: usize = 64;

/// Human readable display name. Surrounding whitespace is trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayName(String);

impl DisplayName {
    /// Validate and construct a display name.
    pub fn new(name: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if trimmed.chars().count() > DISPLAY_NAME_MAX {
            return Err(UserValidationError::NameTooLong {
                max: DISPLAY_NAME_MAX,
            });
        }
        if trimmed.chars().any(char::is_control) {
            return Err(UserValidationError::NameInvalidCharacters);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Longest accepted email address, matching the `users.email` column.
pub const EMAIL_MAX: usize = 320;

/// Longest accepted federated identifier, matching `users.federated_id`.
pub const FEDERATED_ID_MAX: usize = 255;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Email address used as the local login name.
///
/// Lookups are exact matches on the trimmed value; case is preserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an email address.
    pub fn new(email: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = email.as_ref().trim();
        if trimmed.chars().count() > EMAIL_MAX {
            return Err(UserValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        if !email_regex().is_match(trimmed) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One-way salted password hash in its encoded (PHC/modular crypt) form.
///
/// `Debug` never prints the encoded value.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded hash produced by a password hasher or read from storage.
    pub fn from_encoded(encoded: impl Into<String>) -> Result<Self, UserValidationError> {
        let encoded = encoded.into();
        if encoded.trim().is_empty() {
            return Err(UserValidationError::EmptyPasswordHash);
        }
        Ok(Self(encoded))
    }

    /// Encoded hash string.
    pub fn as_encoded(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// Identifier issued by a third-party identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FederatedId(String);

impl FederatedId {
    /// Validate and construct a federated identifier.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = id.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyFederatedId);
        }
        if trimmed.chars().count() > FEDERATED_ID_MAX {
            return Err(UserValidationError::FederatedIdTooLong {
                max: FEDERATED_ID_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for FederatedId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for FederatedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Profile image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail(Url);

impl Thumbnail {
    /// Parse an absolute URL.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Url::parse(raw.as_ref().trim())
            .map(Self)
            .map_err(|_| UserValidationError::InvalidThumbnail)
    }

    /// Borrow the URL.
    pub fn as_url(&self) -> &Url {
        &self.0
    }
}

impl fmt::Display for Thumbnail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// Unvalidated-by-shape bundle used to rebuild a [`User`] from storage.
#[derive(Debug, Clone)]
pub struct UserParts {
    /// Stable identifier.
    pub id: UserId,
    /// Display name.
    pub name: DisplayName,
    /// Email address, required for local accounts.
    pub email: Option<EmailAddress>,
    /// Local password hash.
    pub password_hash: Option<PasswordHash>,
    /// Identity-provider subject.
    pub federated_id: Option<FederatedId>,
    /// Profile image.
    pub thumbnail: Option<Thumbnail>,
}

/// Identity record.
///
/// ## Invariants
/// - At least one of `password_hash` and `federated_id` is present.
/// - A record with a `password_hash` always has an `email`.
/// - The plaintext password is never held; only its hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    name: DisplayName,
    email: Option<EmailAddress>,
    password_hash: Option<PasswordHash>,
    federated_id: Option<FederatedId>,
    thumbnail: Option<Thumbnail>,
}

impl User {
    /// Build a local account.
    pub fn local(
        id: UserId,
        name: DisplayName,
        email: EmailAddress,
        password_hash: PasswordHash,
    ) -> Self {
        Self {
            id,
            name,
            email: Some(email),
            password_hash: Some(password_hash),
            federated_id: None,
            thumbnail: None,
        }
    }

    /// Build an account created through an identity provider.
    pub fn federated(
        id: UserId,
        name: DisplayName,
        federated_id: FederatedId,
        email: Option<EmailAddress>,
        thumbnail: Option<Thumbnail>,
    ) -> Self {
        Self {
            id,
            name,
            email,
            password_hash: None,
            federated_id: Some(federated_id),
            thumbnail,
        }
    }

    /// Rebuild a user from stored parts, enforcing the record invariants.
    ///
    /// # Examples
    /// ```
    /// use travel_auth::domain::{
    ///     DisplayName, UserId, UserParts, User, UserValidationError,
    /// };
    ///
    /// let parts = UserParts {
    ///     id: UserId::random(),
    ///     name: DisplayName::new("Ada").expect("name"),
    ///     email: None,
    ///     password_hash: None,
    ///     federated_id: None,
    ///     thumbnail: None,
    /// };
    /// assert_eq!(
    ///     User::from_parts(parts).unwrap_err(),
    ///     UserValidationError::MissingCredential,
    /// );
    /// ```
    pub fn from_parts(parts: UserParts) -> Result<Self, UserValidationError> {
        let UserParts {
            id,
            name,
            email,
            password_hash,
            federated_id,
            thumbnail,
        } = parts;

        if password_hash.is_none() && federated_id.is_none() {
            return Err(UserValidationError::MissingCredential);
        }
        if password_hash.is_some() && email.is_none() {
            return Err(UserValidationError::InvalidEmail);
        }

        Ok(Self {
            id,
            name,
            email,
            password_hash,
            federated_id,
            thumbnail,
        })
    }

    /// Copy of this record with its password hash replaced.
    ///
    /// Fails when the record has no email, since local login needs one.
    pub fn with_password_hash(&self, hash: PasswordHash) -> Result<Self, UserValidationError> {
        if self.email.is_none() {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self {
            password_hash: Some(hash),
            ..self.clone()
        })
    }

    /// Stable identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Display name.
    pub fn name(&self) -> &DisplayName {
        &self.name
    }

    /// Email address, if known.
    pub fn email(&self) -> Option<&EmailAddress> {
        self.email.as_ref()
    }

    /// Local password hash, if this is a local account.
    pub fn password_hash(&self) -> Option<&PasswordHash> {
        self.password_hash.as_ref()
    }

    /// Identity-provider subject, if this account is federated.
    pub fn federated_id(&self) -> Option<&FederatedId> {
        self.federated_id.as_ref()
    }

    /// Profile image.
    pub fn thumbnail(&self) -> Option<&Thumbnail> {
        self.thumbnail.as_ref()
    }
}
