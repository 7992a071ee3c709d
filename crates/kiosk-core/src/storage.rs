//! Key-value blob storage port.
//!
//! Both engines persist whole documents under string keys, the way a
//! browser's local storage is used: every write replaces the previous value
//! (last write wins), and there is no partial update.

use crate::error::Result;

/// Storage keys used by the engines.
pub mod keys {
    /// Serialized message sequence.
    pub const CONVERSATION_HISTORY: &str = "conversation.history";
    /// Serialized line-item sequence.
    pub const CART_ITEMS: &str = "cart.items";
    /// Pending transaction code (JSON string).
    pub const TRANSACTION_CODE: &str = "cart.transaction_code";
    /// Pending transaction amount (JSON number).
    pub const TRANSACTION_AMOUNT: &str = "cart.transaction_amount";
}

/// An abstract string-keyed blob store.
///
/// Implementations must treat `set` as a whole-document replace and
/// `remove` of a missing key as success.
pub trait KeyValueStore: Send + Sync {
    /// Returns the stored value, or `None` if the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replaces the stored value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Deletes the stored value. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Outcome of reading a persisted document at startup.
///
/// Parse failures and schema mismatches are kept apart so they can be
/// logged differently, but the engines recover from both by starting empty.
#[derive(Debug, Clone, PartialEq)]
pub enum Hydration<T> {
    /// Nothing was stored under the key.
    Missing,
    /// The document was read and validated.
    Loaded(T),
    /// The document exists but could not be parsed or validated.
    Corrupted(String),
    /// The document carries a schema version this build cannot read.
    SchemaMismatch { found: String, expected: String },
}

impl<T> Hydration<T> {
    /// Returns true if stored data existed but had to be discarded.
    pub fn is_data_loss(&self) -> bool {
        matches!(self, Self::Corrupted(_) | Self::SchemaMismatch { .. })
    }

    /// Maps the loaded value, keeping every other outcome as-is.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Hydration<U> {
        match self {
            Self::Missing => Hydration::Missing,
            Self::Loaded(value) => Hydration::Loaded(f(value)),
            Self::Corrupted(reason) => Hydration::Corrupted(reason),
            Self::SchemaMismatch { found, expected } => {
                Hydration::SchemaMismatch { found, expected }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_loss_detection() {
        assert!(!Hydration::<()>::Missing.is_data_loss());
        assert!(!Hydration::Loaded(1).is_data_loss());
        assert!(Hydration::<()>::Corrupted("bad".into()).is_data_loss());
        assert!(
            Hydration::<()>::SchemaMismatch {
                found: "2.0.0".into(),
                expected: "1.0.0".into()
            }
            .is_data_loss()
        );
    }

    #[test]
    fn test_map_only_touches_loaded() {
        assert_eq!(Hydration::Loaded(2).map(|v| v * 10), Hydration::Loaded(20));
        assert_eq!(
            Hydration::<i32>::Corrupted("x".into()).map(|v| v * 10),
            Hydration::Corrupted("x".into())
        );
    }
}
