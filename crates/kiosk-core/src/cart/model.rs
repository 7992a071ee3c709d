//! Cart state machine.
//!
//! States: empty ⇄ has items → checkout pending → confirmed (back to empty).
//!
//! Every mutation returns the effects the caller must carry out. Storage
//! effects always carry the full sequence, never a delta.

use super::line_item::{LineItem, Product};
use super::transaction::{TransactionCodeGenerator, TransactionRecord};
use crate::error::{KioskError, Result};
use crate::storage::Hydration;

/// Side effects requested by a cart transition.
#[derive(Debug, Clone, PartialEq)]
pub enum CartEffect {
    /// Replace the persisted line items.
    PersistItems(Vec<LineItem>),
    /// Delete the persisted line items.
    ClearItems,
    /// Store the pending transaction.
    PersistTransaction(TransactionRecord),
    /// Delete the pending transaction.
    ClearTransaction,
    /// Refresh the item-count badge.
    UpdateBadge(u32),
    /// Refresh the cart listing and running total.
    RenderItems { items: Vec<LineItem>, total: f64 },
    /// Hand off to the confirmation step with this record.
    ShowCheckout(TransactionRecord),
    /// The customer confirmed the transfer; the view redirects.
    Confirmed(TransactionRecord),
}

/// The cart: ordered line items keyed by product id, plus the pending
/// checkout record.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    items: Vec<LineItem>,
    pending: Option<TransactionRecord>,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The pending checkout record, if checkout was started.
    pub fn pending(&self) -> Option<&TransactionRecord> {
        self.pending.as_ref()
    }

    /// Sum of `price * quantity` over all lines. Never rounded.
    pub fn total(&self) -> f64 {
        self.items.iter().map(LineItem::subtotal).sum()
    }

    /// Sum of quantities, for the badge. Saturates at `u32::MAX`.
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |count, item| count.saturating_add(item.quantity))
    }

    /// Adds one unit of `product`.
    ///
    /// An existing line with the same id gets its quantity incremented;
    /// otherwise a new line with quantity 1 is appended.
    pub fn add_item(&mut self, product: Product) -> Result<Vec<CartEffect>> {
        product.validate()?;
        match self.items.iter_mut().find(|item| item.id == product.id) {
            Some(item) => item.quantity = item.quantity.saturating_add(1),
            None => self.items.push(LineItem::from_product(product)),
        }
        Ok(self.changed())
    }

    /// Removes the line for `id`. Unknown ids are a no-op.
    pub fn remove_item(&mut self, id: u64) -> Vec<CartEffect> {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        if self.items.len() == before {
            return Vec::new();
        }
        self.changed()
    }

    /// Sets the quantity of the line for `id`; `qty <= 0` removes it.
    ///
    /// Unknown ids are a no-op, as is setting the current quantity again.
    pub fn set_quantity(&mut self, id: u64, qty: i64) -> Vec<CartEffect> {
        if qty <= 0 {
            return self.remove_item(id);
        }
        let qty = u32::try_from(qty).unwrap_or(u32::MAX);
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) if item.quantity != qty => {
                item.quantity = qty;
                self.changed()
            }
            _ => Vec::new(),
        }
    }

    /// One more unit of an existing line.
    pub fn increment(&mut self, id: u64) -> Vec<CartEffect> {
        match self.quantity_of(id) {
            Some(q) => self.set_quantity(id, i64::from(q) + 1),
            None => Vec::new(),
        }
    }

    /// One fewer unit of an existing line; removes it at zero.
    pub fn decrement(&mut self, id: u64) -> Vec<CartEffect> {
        match self.quantity_of(id) {
            Some(q) => self.set_quantity(id, i64::from(q) - 1),
            None => Vec::new(),
        }
    }

    /// Empties the cart and forgets any pending checkout.
    pub fn clear(&mut self) -> Vec<CartEffect> {
        self.items.clear();
        self.pending = None;
        vec![
            CartEffect::ClearItems,
            CartEffect::ClearTransaction,
            CartEffect::UpdateBadge(0),
            CartEffect::RenderItems {
                items: Vec::new(),
                total: 0.0,
            },
        ]
    }

    /// Starts checkout.
    ///
    /// Refused with `KioskError::EmptyCart` when there are no items; the cart
    /// is left untouched. While a record is already pending it is reused and
    /// nothing is regenerated or persisted again.
    pub fn checkout(
        &mut self,
        codes: &dyn TransactionCodeGenerator,
    ) -> Result<Vec<CartEffect>> {
        if self.items.is_empty() {
            return Err(KioskError::EmptyCart);
        }
        if let Some(existing) = &self.pending {
            return Ok(vec![CartEffect::ShowCheckout(existing.clone())]);
        }

        let record = TransactionRecord {
            code: codes.next_code(),
            amount: self.total(),
        };
        self.pending = Some(record.clone());
        Ok(vec![
            CartEffect::PersistTransaction(record.clone()),
            CartEffect::ShowCheckout(record),
        ])
    }

    /// The customer says the transfer was made.
    ///
    /// This is advisory only: nothing here verifies a payment. It resets the
    /// cart and the pending record. Without a pending record it does nothing.
    pub fn confirm(&mut self) -> Vec<CartEffect> {
        let Some(record) = self.pending.take() else {
            return Vec::new();
        };
        self.items.clear();
        vec![
            CartEffect::ClearItems,
            CartEffect::ClearTransaction,
            CartEffect::UpdateBadge(0),
            CartEffect::Confirmed(record),
        ]
    }

    /// Restores state read at startup.
    ///
    /// Unusable item data resets the cart exactly like `clear`. A pending
    /// record without items is dropped.
    pub fn hydrate(
        &mut self,
        items: Hydration<Vec<LineItem>>,
        pending: Option<TransactionRecord>,
    ) -> Vec<CartEffect> {
        match items {
            Hydration::Loaded(items) if !items.is_empty() => {
                self.items = items;
                self.pending = pending;
                self.view_effects()
            }
            Hydration::Loaded(_) | Hydration::Missing => {
                self.items.clear();
                self.pending = None;
                let mut effects = Vec::new();
                if pending.is_some() {
                    effects.push(CartEffect::ClearTransaction);
                }
                effects.extend(self.view_effects());
                effects
            }
            Hydration::Corrupted(_) | Hydration::SchemaMismatch { .. } => self.clear(),
        }
    }

    fn quantity_of(&self, id: u64) -> Option<u32> {
        self.items
            .iter()
            .find(|item| item.id == id)
            .map(|item| item.quantity)
    }

    /// Effects after a line mutation. Emptying the cart also drops a
    /// pending checkout, since a record never outlives its items.
    fn changed(&mut self) -> Vec<CartEffect> {
        let mut effects = vec![CartEffect::PersistItems(self.items.clone())];
        if self.items.is_empty() && self.pending.take().is_some() {
            effects.push(CartEffect::ClearTransaction);
        }
        effects.extend(self.view_effects());
        effects
    }

    fn view_effects(&self) -> Vec<CartEffect> {
        vec![
            CartEffect::UpdateBadge(self.item_count()),
            CartEffect::RenderItems {
                items: self.items.clone(),
                total: self.total(),
            },
        ]
    }
}
