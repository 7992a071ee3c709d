//! Storage backends.

pub mod config_storage;
pub mod file_store;
pub mod memory_store;
pub mod secret_storage;

pub use config_storage::ConfigStorage;
pub use file_store::FileKeyValueStore;
pub use memory_store::MemoryKeyValueStore;
pub use secret_storage::{API_KEY_ENV, SecretStorage};
