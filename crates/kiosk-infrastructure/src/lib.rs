pub mod dto;
pub mod kv_cart_repository;
pub mod kv_conversation_repository;
pub mod paths;
pub mod storage;
pub mod transaction_code;

pub use crate::kv_cart_repository::KvCartRepository;
pub use crate::kv_conversation_repository::KvConversationRepository;
pub use crate::paths::KioskPaths;
pub use crate::storage::{FileKeyValueStore, MemoryKeyValueStore};
pub use crate::transaction_code::TimeRandomCodeGenerator;
