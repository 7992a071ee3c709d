//! Cart DTOs and migrations.
//!
//! ## Version History
//! - **0.1.0**: Bare JSON array of `{id, name, price, quantity}` objects
//! - **1.0.0**: Same payload under `data`, next to the `version` field

use semver::Version;
use serde::{Deserialize, Serialize};
use version_migrate::{FromDomain, IntoDomain, MigratesTo, Versioned};

use kiosk_core::cart::LineItem;
use kiosk_core::error::Result;

/// Migrator entity name of the line-item document.
pub const CART_ITEMS_ENTITY: &str = "cart_items";

/// Current schema version of the line-item document.
pub const CART_ITEMS_VERSION: Version = Version::new(1, 0, 0);

/// Version assigned to documents written before the envelope existed.
pub const CART_ITEMS_LEGACY_VERSION: &str = "0.1.0";

/// One stored line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItemV1 {
    pub id: u64,
    pub name: String,
    pub price: f64,
    pub quantity: u32,
}

/// Legacy line items: the bare array.
#[derive(Debug, Clone, Serialize, Deserialize, Versioned)]
#[versioned(version = "0.1.0")]
pub struct CartItemsV0_1 {
    pub data: Vec<LineItemV1>,
}

/// Line-item document V1.0.0.
#[derive(Debug, Clone, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
pub struct CartItemsV1_0 {
    pub data: Vec<LineItemV1>,
}

/// Type alias for the latest line-item document version.
pub type CartItemsDTO = CartItemsV1_0;

impl MigratesTo<CartItemsV1_0> for CartItemsV0_1 {
    fn migrate(self) -> CartItemsV1_0 {
        CartItemsV1_0 { data: self.data }
    }
}

impl IntoDomain<Vec<LineItem>> for CartItemsV1_0 {
    fn into_domain(self) -> Vec<LineItem> {
        self.data
            .into_iter()
            .map(|dto| LineItem {
                id: dto.id,
                name: dto.name,
                price: dto.price,
                quantity: dto.quantity,
            })
            .collect()
    }
}

impl FromDomain<Vec<LineItem>> for CartItemsV1_0 {
    fn from_domain(items: Vec<LineItem>) -> Self {
        CartItemsV1_0 {
            data: items
                .into_iter()
                .map(|item| LineItemV1 {
                    id: item.id,
                    name: item.name,
                    price: item.price,
                    quantity: item.quantity,
                })
                .collect(),
        }
    }
}

/// Creates the migrator for the line-item document.
///
/// # Migration Path
///
/// - V0.1 → V1.0: Wraps the bare array
/// - V1.0 → `Vec<LineItem>`
pub fn create_cart_items_migrator() -> Result<version_migrate::Migrator> {
    let mut migrator = version_migrate::Migrator::builder().build();

    let items_path = version_migrate::Migrator::define(CART_ITEMS_ENTITY)
        .from::<CartItemsV0_1>()
        .step::<CartItemsV1_0>()
        .into_with_save::<Vec<LineItem>>();

    migrator.register(items_path)?;
    Ok(migrator)
}
