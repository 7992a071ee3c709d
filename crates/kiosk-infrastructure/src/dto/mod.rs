//! Persisted document formats.
//!
//! Domain models never touch the store directly; each document is mapped to
//! a `Versioned` DTO and goes through its migrator on load and save.

pub mod cart;
pub mod conversation;
pub mod envelope;

pub use cart::{
    CART_ITEMS_ENTITY, CART_ITEMS_LEGACY_VERSION, CART_ITEMS_VERSION, CartItemsDTO, LineItemV1,
    create_cart_items_migrator,
};
pub use conversation::{
    CONVERSATION_ENTITY, CONVERSATION_LEGACY_VERSION, CONVERSATION_VERSION,
    ConversationHistoryDTO, MessageV1, create_conversation_migrator,
};
pub use envelope::{DocumentSchema, decode_document, encode_document};
