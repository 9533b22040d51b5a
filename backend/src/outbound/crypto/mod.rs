//! Password hashing adapters.

mod bcrypt_hasher;

pub use bcrypt_hasher::{BcryptHasherError, BcryptPasswordHasher, DEFAULT_BCRYPT_COST};
