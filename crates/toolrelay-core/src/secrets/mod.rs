//! Secret storage for provider API keys
//!
//! - `SecretStore` trait for implementing custom stores
//! - `EnvSecretStore`: environment variables (and `.env` via the config layer)
//! - `MemorySecretStore`: in-memory, for tests and keys taken from config files

mod traits;
mod env_store;
mod memory_store;

pub use traits::{SecretStore, SecretStoreError, SecretStoreResult};
pub use env_store::EnvSecretStore;
pub use memory_store::MemorySecretStore;
