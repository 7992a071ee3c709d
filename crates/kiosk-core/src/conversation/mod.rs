//! Conversation domain module.
//!
//! # Module Structure
//!
//! - `message`: Message types (`MessageRole`, `Message`)
//! - `model`: The conversation state machine (`Conversation`, events, effects)
//! - `client`: Completion API port (`CompletionClient`)
//! - `repository`: Persistence port (`ConversationRepository`)

mod client;
mod message;
mod model;
mod repository;

pub use client::CompletionClient;
pub use message::{Message, MessageRole};
pub use model::{Conversation, ConversationEffect, ConversationEvent, error_notice};
pub use repository::ConversationRepository;
