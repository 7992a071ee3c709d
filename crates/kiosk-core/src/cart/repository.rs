//! Cart repository trait.

use super::line_item::LineItem;
use super::transaction::TransactionRecord;
use crate::error::Result;
use crate::storage::Hydration;

/// Persistence for the cart: the line-item sequence plus the pending
/// transaction record (stored as two separate values).
pub trait CartRepository: Send + Sync {
    /// Reads the persisted line items.
    fn load_items(&self) -> Result<Hydration<Vec<LineItem>>>;

    /// Replaces the persisted line items.
    fn save_items(&self, items: &[LineItem]) -> Result<()>;

    /// Deletes the persisted line items.
    fn clear_items(&self) -> Result<()>;

    /// Reads the pending transaction, if both of its fields are stored and
    /// readable.
    fn load_transaction(&self) -> Result<Option<TransactionRecord>>;

    fn save_transaction(&self, record: &TransactionRecord) -> Result<()>;

    fn clear_transaction(&self) -> Result<()>;
}
