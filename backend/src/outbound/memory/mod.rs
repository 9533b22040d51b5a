//! Process-local adapters for development and tests.

mod in_memory_credential_store;
mod session_store;

pub use in_memory_credential_store::InMemoryCredentialStore;
pub use session_store::InMemorySessionStore;
