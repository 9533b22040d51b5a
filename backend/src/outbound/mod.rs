//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! Adapters translate between domain types and infrastructure-specific
//! representations and contain no business logic:
//!
//! - **persistence**: PostgreSQL credential store using Diesel
//! - **memory**: process-local credential and session stores
//! - **crypto**: bcrypt password hashing
//! - **identity**: Google OAuth / OpenID Connect client

pub mod crypto;
pub mod identity;
pub mod memory;
pub mod persistence;
