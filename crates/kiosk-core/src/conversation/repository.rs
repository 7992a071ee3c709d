//! Conversation repository trait.

use super::message::Message;
use crate::error::Result;
use crate::storage::Hydration;

/// Persistence for the conversation history.
///
/// The history is stored as one document: `save` always replaces the whole
/// sequence, never appends.
pub trait ConversationRepository: Send + Sync {
    /// Reads the persisted history.
    ///
    /// # Returns
    ///
    /// - `Ok(Hydration::Loaded(_))`: History read and validated
    /// - `Ok(Hydration::Missing)`: Nothing stored yet
    /// - `Ok(Hydration::Corrupted(_) | Hydration::SchemaMismatch { .. })`: Stored data unusable
    /// - `Err(_)`: The underlying store could not be read at all
    fn load(&self) -> Result<Hydration<Vec<Message>>>;

    /// Replaces the persisted history with `messages`.
    fn save(&self, messages: &[Message]) -> Result<()>;

    /// Deletes the persisted history.
    fn clear(&self) -> Result<()>;
}
