//! Identity provider adapters.

mod dto;
mod google;

pub use google::{GoogleIdentityProvider, GoogleOAuthConfig};
