//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementation of the credential store port backed by
//! PostgreSQL via `diesel-async` and `bb8` connection pooling.
//!
//! - **Thin adapters**: only translate between Diesel rows and domain types.
//! - **Internal models**: row structs (`models.rs`) and the schema
//!   (`schema.rs`) never leak into the domain.
//! - **Strongly typed errors**: database failures map to
//!   `CredentialStoreError` variants.
//!
//! # Example
//!
//! ```ignore
//! use travel_auth::outbound::persistence::{DbPool, DieselCredentialStore, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/travel")).await?;
//! let store = DieselCredentialStore::new(pool);
//! ```

mod diesel_credential_store;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_credential_store::DieselCredentialStore;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
