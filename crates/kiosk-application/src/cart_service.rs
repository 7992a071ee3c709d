//! Cart use case implementation.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use kiosk_core::cart::{
    Cart, CartEffect, CartRepository, LineItem, Product, TransactionCodeGenerator,
    TransactionRecord,
};
use kiosk_core::error::{KioskError, Result};
use kiosk_core::storage::Hydration;

use crate::view::CartView;

/// Message shown when checking out with nothing in the cart.
pub const EMPTY_CART_ALERT: &str = "Your cart is empty.";

/// Use case for the shopping cart and the bank-transfer checkout.
///
/// # Responsibilities
///
/// - Keeping line items, badge and listing in sync after every mutation
/// - Persisting the full item list on every change
/// - Generating and persisting the transaction record at checkout
/// - Resetting everything once the customer confirms the transfer
///
/// All operations are synchronous.
pub struct CartService {
    state: Mutex<Cart>,
    repository: Arc<dyn CartRepository>,
    codes: Arc<dyn TransactionCodeGenerator>,
    views: RwLock<Vec<Arc<dyn CartView>>>,
}

impl CartService {
    pub fn new(
        repository: Arc<dyn CartRepository>,
        codes: Arc<dyn TransactionCodeGenerator>,
    ) -> Self {
        Self {
            state: Mutex::new(Cart::new()),
            repository,
            codes,
            views: RwLock::new(Vec::new()),
        }
    }

    /// Registers a view for subsequent updates.
    pub fn subscribe(&self, view: Arc<dyn CartView>) {
        self.views
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(view);
    }

    fn state(&self) -> MutexGuard<'_, Cart> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn items(&self) -> Vec<LineItem> {
        self.state().items().to_vec()
    }

    pub fn total(&self) -> f64 {
        self.state().total()
    }

    pub fn item_count(&self) -> u32 {
        self.state().item_count()
    }

    pub fn pending(&self) -> Option<TransactionRecord> {
        self.state().pending().cloned()
    }

    /// Restores the stored items and any pending transaction.
    ///
    /// Unreadable item data clears the cart; nothing is surfaced to the view
    /// beyond the refreshed (empty) listing.
    ///
    /// # Returns
    ///
    /// The outcome of reading storage, with the number of restored lines.
    pub fn hydrate(&self) -> Hydration<usize> {
        let items = match self.repository.load_items() {
            Ok(items) => items,
            Err(e) => {
                tracing::error!("[CartService] Failed to read cart items: {}", e);
                Hydration::Missing
            }
        };
        let pending = match self.repository.load_transaction() {
            Ok(pending) => pending,
            Err(e) => {
                tracing::error!("[CartService] Failed to read pending transaction: {}", e);
                None
            }
        };

        match &items {
            Hydration::Corrupted(reason) => {
                tracing::warn!("[CartService] Stored cart is corrupted, clearing: {}", reason);
            }
            Hydration::SchemaMismatch { found, expected } => {
                tracing::warn!(
                    "[CartService] Stored cart has schema {} (expected {}), clearing",
                    found,
                    expected
                );
            }
            Hydration::Loaded(lines) => {
                tracing::info!("[CartService] Restored {} cart lines", lines.len());
            }
            Hydration::Missing => {}
        }

        let report = items.clone().map(|lines| lines.len());
        let effects = self.state().hydrate(items, pending);
        self.execute(effects);
        report
    }

    /// Adds one unit of `product`.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Item added or its quantity incremented
    /// - `Err(KioskError::Validation)`: The price is negative or not finite
    pub fn add_item(&self, product: Product) -> Result<()> {
        let effects = self.state().add_item(product)?;
        self.execute(effects);
        Ok(())
    }

    pub fn remove_item(&self, id: u64) {
        let effects = self.state().remove_item(id);
        self.execute(effects);
    }

    /// Sets the quantity of a line; zero or less removes it.
    pub fn set_quantity(&self, id: u64, qty: i64) {
        let effects = self.state().set_quantity(id, qty);
        self.execute(effects);
    }

    pub fn increment(&self, id: u64) {
        let effects = self.state().increment(id);
        self.execute(effects);
    }

    pub fn decrement(&self, id: u64) {
        let effects = self.state().decrement(id);
        self.execute(effects);
    }

    pub fn clear(&self) {
        let effects = self.state().clear();
        self.execute(effects);
    }

    /// Starts checkout and returns the transfer record to display.
    ///
    /// # Returns
    ///
    /// - `Ok(TransactionRecord)`: New or already pending record
    /// - `Err(KioskError::EmptyCart)`: No items; the views got an alert
    pub fn checkout(&self) -> Result<TransactionRecord> {
        let result = self.state().checkout(self.codes.as_ref());
        let effects = match result {
            Ok(effects) => effects,
            Err(KioskError::EmptyCart) => {
                tracing::info!("[CartService] Checkout refused: cart is empty");
                self.views().iter().for_each(|v| v.alert(EMPTY_CART_ALERT));
                return Err(KioskError::EmptyCart);
            }
            Err(e) => return Err(e),
        };

        let record = effects.iter().find_map(|effect| match effect {
            CartEffect::ShowCheckout(record) => Some(record.clone()),
            _ => None,
        });
        self.execute(effects);

        let record =
            record.ok_or_else(|| KioskError::internal("checkout produced no transaction"))?;
        tracing::info!(
            "[CartService] Checkout pending: code {} amount {}",
            record.code,
            record.amount
        );
        Ok(record)
    }

    /// Confirms the transfer for the pending checkout.
    ///
    /// Returns the confirmed record, or `None` when no checkout was pending.
    pub fn confirm(&self) -> Option<TransactionRecord> {
        let effects = self.state().confirm();
        let record = effects.iter().find_map(|effect| match effect {
            CartEffect::Confirmed(record) => Some(record.clone()),
            _ => None,
        });
        self.execute(effects);

        if let Some(record) = &record {
            tracing::info!("[CartService] Transfer confirmed: code {}", record.code);
        }
        record
    }

    fn views(&self) -> Vec<Arc<dyn CartView>> {
        self.views
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Runs effects in order. Storage failures are logged and do not roll
    /// back the in-memory state.
    fn execute(&self, effects: Vec<CartEffect>) {
        let views = self.views();
        for effect in effects {
            let stored = match &effect {
                CartEffect::PersistItems(items) => self.repository.save_items(items),
                CartEffect::ClearItems => self.repository.clear_items(),
                CartEffect::PersistTransaction(record) => self.repository.save_transaction(record),
                CartEffect::ClearTransaction => self.repository.clear_transaction(),
                CartEffect::UpdateBadge(count) => {
                    views.iter().for_each(|v| v.update_badge(*count));
                    Ok(())
                }
                CartEffect::RenderItems { items, total } => {
                    views.iter().for_each(|v| v.render_items(items, *total));
                    Ok(())
                }
                CartEffect::ShowCheckout(record) => {
                    views.iter().for_each(|v| v.show_checkout(record));
                    Ok(())
                }
                CartEffect::Confirmed(record) => {
                    views.iter().for_each(|v| v.confirmed(record));
                    Ok(())
                }
            };
            if let Err(e) = stored {
                tracing::error!("[CartService] Failed to apply {:?}: {}", effect, e);
            }
        }
    }
}
