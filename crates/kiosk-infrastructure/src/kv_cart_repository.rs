//! Key-value backed CartRepository implementation.

use std::sync::Arc;

use kiosk_core::cart::{CartRepository, LineItem, TransactionRecord, validate_items};
use kiosk_core::error::Result;
use kiosk_core::storage::{Hydration, KeyValueStore, keys};

use crate::dto::{
    CART_ITEMS_ENTITY, CART_ITEMS_LEGACY_VERSION, CART_ITEMS_VERSION, DocumentSchema,
    create_cart_items_migrator, decode_document, encode_document,
};

const SCHEMA: DocumentSchema<'static> = DocumentSchema {
    entity: CART_ITEMS_ENTITY,
    current: &CART_ITEMS_VERSION,
    legacy: CART_ITEMS_LEGACY_VERSION,
};

/// Stores line items as one versioned document and the pending transaction
/// as two plain JSON values (code and amount).
pub struct KvCartRepository {
    store: Arc<dyn KeyValueStore>,
}

impl KvCartRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn read_code(&self) -> Result<Option<String>> {
        Ok(self
            .store
            .get(keys::TRANSACTION_CODE)?
            .and_then(|raw| serde_json::from_str::<String>(&raw).ok())
            .filter(|code| !code.is_empty()))
    }

    fn read_amount(&self) -> Result<Option<f64>> {
        Ok(self
            .store
            .get(keys::TRANSACTION_AMOUNT)?
            .and_then(|raw| serde_json::from_str::<f64>(&raw).ok())
            .filter(|amount| amount.is_finite() && *amount >= 0.0))
    }
}

impl CartRepository for KvCartRepository {
    fn load_items(&self) -> Result<Hydration<Vec<LineItem>>> {
        let Some(raw) = self.store.get(keys::CART_ITEMS)? else {
            return Ok(Hydration::Missing);
        };

        let migrator = create_cart_items_migrator()?;
        let decoded: Hydration<Vec<LineItem>> = decode_document(&migrator, SCHEMA, &raw);

        match decoded {
            Hydration::Loaded(items) => match validate_items(&items) {
                Ok(()) => Ok(Hydration::Loaded(items)),
                Err(e) => Ok(Hydration::Corrupted(e.to_string())),
            },
            other => Ok(other),
        }
    }

    fn save_items(&self, items: &[LineItem]) -> Result<()> {
        let migrator = create_cart_items_migrator()?;
        let raw = encode_document(&migrator, SCHEMA, items)?;
        self.store.set(keys::CART_ITEMS, &raw)
    }

    fn clear_items(&self) -> Result<()> {
        self.store.remove(keys::CART_ITEMS)
    }

    fn load_transaction(&self) -> Result<Option<TransactionRecord>> {
        match (self.read_code()?, self.read_amount()?) {
            (Some(code), Some(amount)) => Ok(Some(TransactionRecord { code, amount })),
            (None, None) => Ok(None),
            _ => {
                tracing::warn!("[KvCartRepository] Dropping incomplete transaction record");
                self.clear_transaction()?;
                Ok(None)
            }
        }
    }

    fn save_transaction(&self, record: &TransactionRecord) -> Result<()> {
        self.store
            .set(keys::TRANSACTION_CODE, &serde_json::to_string(&record.code)?)?;
        self.store
            .set(keys::TRANSACTION_AMOUNT, &serde_json::to_string(&record.amount)?)
    }

    fn clear_transaction(&self) -> Result<()> {
        self.store.remove(keys::TRANSACTION_CODE)?;
        self.store.remove(keys::TRANSACTION_AMOUNT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKeyValueStore;

    fn setup() -> (Arc<MemoryKeyValueStore>, KvCartRepository) {
        let store = Arc::new(MemoryKeyValueStore::new());
        let repo = KvCartRepository::new(store.clone());
        (store, repo)
    }

    fn item(id: u64, price: f64, quantity: u32) -> LineItem {
        LineItem {
            id,
            name: format!("Item {}", id),
            price,
            quantity,
        }
    }

    #[test]
    fn test_items_round_trip() {
        let (_store, repo) = setup();
        let items = vec![item(1, 10.0, 2), item(2, 5.5, 1)];

        repo.save_items(&items).unwrap();
        assert_eq!(repo.load_items().unwrap(), Hydration::Loaded(items));

        repo.clear_items().unwrap();
        assert_eq!(repo.load_items().unwrap(), Hydration::Missing);
    }

    #[test]
    fn test_invalid_items_are_corrupted() {
        let (store, repo) = setup();
        store
            .set(
                keys::CART_ITEMS,
                r#"[{"id":1,"name":"A","price":1.0,"quantity":0}]"#,
            )
            .unwrap();
        assert!(matches!(repo.load_items().unwrap(), Hydration::Corrupted(_)));

        let duplicate_ids = r#"[
            {"id":1,"name":"A","price":1.0,"quantity":1},
            {"id":1,"name":"A","price":1.0,"quantity":2}
        ]"#;
        store.set(keys::CART_ITEMS, duplicate_ids).unwrap();
        assert!(matches!(repo.load_items().unwrap(), Hydration::Corrupted(_)));
    }

    #[test]
    fn test_legacy_items_are_rewritten_with_version() {
        let (store, repo) = setup();
        store
            .set(
                keys::CART_ITEMS,
                r#"[{"id":7,"name":"Item 7","price":3.0,"quantity":2}]"#,
            )
            .unwrap();

        let Hydration::Loaded(items) = repo.load_items().unwrap() else {
            panic!("legacy items should load");
        };
        assert_eq!(items, vec![item(7, 3.0, 2)]);

        repo.save_items(&items).unwrap();
        let raw = store.get(keys::CART_ITEMS).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], "1.0.0");
        assert_eq!(value["data"][0]["id"], 7);
    }

    #[test]
    fn test_transaction_round_trip() {
        let (_store, repo) = setup();
        let record = TransactionRecord {
            code: "KX9A2B7Q".to_string(),
            amount: 25.5,
        };

        repo.save_transaction(&record).unwrap();
        assert_eq!(repo.load_transaction().unwrap(), Some(record));

        repo.clear_transaction().unwrap();
        assert_eq!(repo.load_transaction().unwrap(), None);
    }

    #[test]
    fn test_partial_transaction_is_dropped() {
        let (store, repo) = setup();
        store.set(keys::TRANSACTION_CODE, r#""ABC""#).unwrap();

        assert_eq!(repo.load_transaction().unwrap(), None);
        assert!(store.get(keys::TRANSACTION_CODE).unwrap().is_none());
    }
}
