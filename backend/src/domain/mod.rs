//! Domain primitives, services and ports.
//!
//! Purpose: define the identity record, the authentication inputs and the
//! services that verify credentials, federate identities, resolve sessions
//! and gate access. Nothing here knows about Actix, Diesel or reqwest.
//!
//! Public surface:
//! - Error / ErrorCode: transport agnostic error payload.
//! - User and its value types: identity record.
//! - LocalCredentialVerifier, FederatedIdentityVerifier,
//!   SessionIdentityManager, AccessGate, AccountService: use-case services.
//! - ports: traits at the hexagon's edges.

pub mod access_gate;
pub mod accounts;
pub mod auth;
pub mod error;
pub mod federated;
pub mod local_verifier;
pub mod ports;
pub mod session_identity;
mod store_support;
pub mod trace_id;
pub mod user;

pub use self::access_gate::{Access, AccessGate};
pub use self::accounts::AccountService;
pub use self::auth::{
    AuthValidationError, AuthorizationCode, FederatedProfile, LoginCredentials, OAuthState,
    PASSWORD_MAX_BYTES, PasswordResetRequest, PlaintextPassword, SignupRequest,
};
pub use self::error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use self::federated::{FederatedIdentityVerifier, FederatedLoginFlow};
pub use self::local_verifier::LocalCredentialVerifier;
pub use self::session_identity::SessionIdentityManager;
pub use self::store_support::DEFAULT_STORE_TIMEOUT;
pub use self::trace_id::TraceId;
pub use self::user::{
    DISPLAY_NAME_MAX, DisplayName, EMAIL_MAX, EmailAddress, FEDERATED_ID_MAX, FederatedId, PasswordHash, Thumbnail, User,
    UserId, UserParts, UserValidationError,
};
