//! Domain ports defining the edges of the hexagon.

mod macros;
pub(crate) use macros::define_port_error;

mod account_registration;
mod credential_store;
mod federated_login;
mod identity_provider;
mod login_service;
mod password_hasher;
mod password_reset;
mod session_resolver;

#[cfg(test)]
pub use account_registration::MockAccountRegistration;
pub use account_registration::AccountRegistration;
#[cfg(test)]
pub use credential_store::MockCredentialStore;
pub use credential_store::{CredentialStore, CredentialStoreError, IdentityField};
#[cfg(test)]
pub use federated_login::MockFederatedLoginService;
pub use federated_login::FederatedLoginService;
#[cfg(test)]
pub use identity_provider::MockIdentityProviderClient;
pub use identity_provider::{IdentityProviderClient, IdentityProviderError};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::{LoginService, VerifyResult};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHasher, PasswordHasherError};
#[cfg(test)]
pub use password_reset::MockPasswordReset;
pub use password_reset::PasswordReset;
#[cfg(test)]
pub use session_resolver::MockSessionResolver;
pub use session_resolver::{SessionResolution, SessionResolver, SessionToken};
