//! View ports.
//!
//! The services never render anything themselves. Front-ends (the terminal
//! REPL, a web page, a test recorder) implement these traits and subscribe
//! to a service.

use kiosk_core::cart::{LineItem, TransactionRecord};
use kiosk_core::conversation::Message;

/// Receives chat view updates from `ConversationService`.
pub trait ChatView: Send + Sync {
    /// Show the empty/welcome state.
    fn show_welcome(&self);

    /// Hide the welcome state before the first bubble.
    fn hide_welcome(&self);

    /// Append a message bubble. Timestamps are a render-time concern.
    fn render_message(&self, message: &Message);

    /// Append an inline error bubble.
    fn render_error(&self, text: &str);

    /// Remove every bubble.
    fn clear_messages(&self);

    fn set_loading(&self, loading: bool);
}

/// Receives cart view updates from `CartService`.
pub trait CartView: Send + Sync {
    /// Refresh the item-count badge.
    fn update_badge(&self, count: u32);

    /// Refresh the listing and the running total.
    fn render_items(&self, items: &[LineItem], total: f64);

    /// Show the transfer code and amount for the pending checkout.
    fn show_checkout(&self, record: &TransactionRecord);

    /// Blocking alert, e.g. when checking out an empty cart.
    fn alert(&self, message: &str);

    /// The customer confirmed the transfer; the view redirects afterwards.
    fn confirmed(&self, record: &TransactionRecord);
}
