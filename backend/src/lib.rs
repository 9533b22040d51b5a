//! Authentication and session identity for the travel booking backend.
//!
//! Layout follows ports and adapters: `domain` holds the identity record,
//! verifiers and the access gate; `outbound` implements the credential store,
//! password hasher and identity provider; `inbound::http` exposes the
//! Actix endpoints and session middleware.

pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
