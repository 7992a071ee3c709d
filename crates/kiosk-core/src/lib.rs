pub mod cart;
pub mod config;
pub mod conversation;
pub mod error;
pub mod storage;

// Re-export common error type
pub use error::{ApiError, KioskError};
