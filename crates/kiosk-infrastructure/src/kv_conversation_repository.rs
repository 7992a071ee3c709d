//! Key-value backed ConversationRepository implementation.

use std::sync::Arc;

use kiosk_core::conversation::{ConversationRepository, Message};
use kiosk_core::error::Result;
use kiosk_core::storage::{Hydration, KeyValueStore, keys};

use crate::dto::{
    CONVERSATION_ENTITY, CONVERSATION_LEGACY_VERSION, CONVERSATION_VERSION, DocumentSchema,
    create_conversation_migrator, decode_document, encode_document,
};

const SCHEMA: DocumentSchema<'static> = DocumentSchema {
    entity: CONVERSATION_ENTITY,
    current: &CONVERSATION_VERSION,
    legacy: CONVERSATION_LEGACY_VERSION,
};

/// Stores the whole history as one versioned document under
/// `conversation.history`.
pub struct KvConversationRepository {
    store: Arc<dyn KeyValueStore>,
}

impl KvConversationRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

impl ConversationRepository for KvConversationRepository {
    fn load(&self) -> Result<Hydration<Vec<Message>>> {
        let Some(raw) = self.store.get(keys::CONVERSATION_HISTORY)? else {
            return Ok(Hydration::Missing);
        };

        let migrator = create_conversation_migrator()?;
        let decoded: Hydration<Vec<Message>> = decode_document(&migrator, SCHEMA, &raw);

        if let Hydration::Loaded(messages) = &decoded {
            tracing::debug!(
                "[KvConversationRepository] Loaded {} messages",
                messages.len()
            );
        }
        Ok(decoded)
    }

    fn save(&self, messages: &[Message]) -> Result<()> {
        let migrator = create_conversation_migrator()?;
        let raw = encode_document(&migrator, SCHEMA, messages)?;
        self.store.set(keys::CONVERSATION_HISTORY, &raw)
    }

    fn clear(&self) -> Result<()> {
        self.store.remove(keys::CONVERSATION_HISTORY)
    }
}
