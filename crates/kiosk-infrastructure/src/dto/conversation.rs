//! Conversation history DTOs and migrations.
//!
//! ## Version History
//! - **0.1.0**: Bare JSON array of `{role, content}` objects (no envelope)
//! - **1.0.0**: Same payload under `data`, next to the `version` field

use semver::Version;
use serde::{Deserialize, Serialize};
use version_migrate::{FromDomain, IntoDomain, MigratesTo, Versioned};

use kiosk_core::conversation::{Message, MessageRole};
use kiosk_core::error::Result;

/// Migrator entity name of the history document.
pub const CONVERSATION_ENTITY: &str = "conversation_history";

/// Current schema version of the history document.
pub const CONVERSATION_VERSION: Version = Version::new(1, 0, 0);

/// Version assigned to documents written before the envelope existed.
pub const CONVERSATION_LEGACY_VERSION: &str = "0.1.0";

/// One stored message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageV1 {
    pub role: MessageRole,
    pub content: String,
}

/// Legacy history: the bare message array.
#[derive(Debug, Clone, Serialize, Deserialize, Versioned)]
#[versioned(version = "0.1.0")]
pub struct ConversationHistoryV0_1 {
    pub data: Vec<MessageV1>,
}

/// History document V1.0.0.
#[derive(Debug, Clone, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
pub struct ConversationHistoryV1_0 {
    pub data: Vec<MessageV1>,
}

/// Type alias for the latest history document version.
pub type ConversationHistoryDTO = ConversationHistoryV1_0;

// ============================================================================
// Migration implementations
// ============================================================================

/// The payload did not change; only the envelope was introduced.
impl MigratesTo<ConversationHistoryV1_0> for ConversationHistoryV0_1 {
    fn migrate(self) -> ConversationHistoryV1_0 {
        ConversationHistoryV1_0 { data: self.data }
    }
}

// ============================================================================
// Domain model conversions
// ============================================================================

impl IntoDomain<Vec<Message>> for ConversationHistoryV1_0 {
    fn into_domain(self) -> Vec<Message> {
        self.data
            .into_iter()
            .map(|dto| Message {
                role: dto.role,
                content: dto.content,
            })
            .collect()
    }
}

impl FromDomain<Vec<Message>> for ConversationHistoryV1_0 {
    fn from_domain(messages: Vec<Message>) -> Self {
        ConversationHistoryV1_0 {
            data: messages
                .into_iter()
                .map(|message| MessageV1 {
                    role: message.role,
                    content: message.content,
                })
                .collect(),
        }
    }
}

// ============================================================================
// Migrator factory
// ============================================================================

/// Creates the migrator for the history document.
///
/// # Migration Path
///
/// - V0.1 → V1.0: Wraps the bare array
/// - V1.0 → `Vec<Message>`: Converts DTOs to domain messages
pub fn create_conversation_migrator() -> Result<version_migrate::Migrator> {
    let mut migrator = version_migrate::Migrator::builder().build();

    let history_path = version_migrate::Migrator::define(CONVERSATION_ENTITY)
        .from::<ConversationHistoryV0_1>()
        .step::<ConversationHistoryV1_0>()
        .into_with_save::<Vec<Message>>();

    migrator.register(history_path)?;
    Ok(migrator)
}
