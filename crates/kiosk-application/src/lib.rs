//! Application layer for Kiosk.
//!
//! This crate drives the pure state machines from `kiosk-core`: it executes
//! their effects against storage, the completion client and the views.

pub mod cart_service;
pub mod conversation_service;
pub mod view;

pub use cart_service::CartService;
pub use conversation_service::{ConversationService, SubmitOutcome};
pub use view::{CartView, ChatView};
