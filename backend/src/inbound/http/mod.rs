//! HTTP inbound adapter exposing the authentication endpoints.

pub mod access;
pub mod accounts;
pub mod error;
pub mod federated;
pub mod health;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
mod validation;

pub use error::ApiResult;
