//! Line item and product types.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{KioskError, Result};

/// A product offered in the storefront, as passed to `Cart::add_item`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product identifier.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Unit price. Must be finite and non-negative.
    pub price: f64,
}

impl Product {
    pub fn new(id: u64, name: impl Into<String>, price: f64) -> Self {
        Self {
            id,
            name: name.into(),
            price,
        }
    }

    /// Rejects prices that would break total computation.
    pub fn validate(&self) -> Result<()> {
        validate_price(self.id, self.price)
    }
}

/// One product entry in the cart.
///
/// `quantity` is always at least 1; a line whose quantity would drop to zero
/// is removed instead of stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: u64,
    pub name: String,
    pub price: f64,
    pub quantity: u32,
}

impl LineItem {
    /// A fresh line for `product` with quantity 1.
    pub fn from_product(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            price: product.price,
            quantity: 1,
        }
    }

    /// `price * quantity`, unrounded.
    pub fn subtotal(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

fn validate_price(id: u64, price: f64) -> Result<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(KioskError::validation(format!(
            "product {} has invalid price {}",
            id, price
        )));
    }
    Ok(())
}

/// Checks the invariants of a stored line-item sequence.
///
/// Used when hydrating: ids must be unique, quantities positive and prices
/// finite and non-negative.
pub fn validate_items(items: &[LineItem]) -> Result<()> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(item.id) {
            return Err(KioskError::validation(format!(
                "duplicate line item id {}",
                item.id
            )));
        }
        if item.quantity == 0 {
            return Err(KioskError::validation(format!(
                "line item {} has zero quantity",
                item.id
            )));
        }
        validate_price(item.id, item.price)?;
    }
    Ok(())
}

/// Formats an amount for display, rounded to two decimal places.
///
/// Stored values are never rounded; this is the only place rounding happens.
pub fn format_amount(amount: f64) -> String {
    format!("{:.2}", amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_validation() {
        assert!(Product::new(1, "X", 10.5).validate().is_ok());
        assert!(Product::new(1, "Free", 0.0).validate().is_ok());
        assert!(Product::new(1, "X", -1.0).validate().is_err());
        assert!(Product::new(1, "X", f64::NAN).validate().is_err());
        assert!(Product::new(1, "X", f64::INFINITY).validate().is_err());
    }

    #[test]
    fn test_validate_items_rejects_duplicates_and_zero_quantity() {
        let line = LineItem::from_product(Product::new(1, "X", 1.0));
        assert!(validate_items(&[line.clone()]).is_ok());
        assert!(validate_items(&[line.clone(), line.clone()]).is_err());

        let zero = LineItem {
            quantity: 0,
            ..line
        };
        assert!(validate_items(&[zero]).is_err());
    }

    #[test]
    fn test_format_amount_rounds_at_display_only() {
        assert_eq!(format_amount(0.0), "0.00");
        assert_eq!(format_amount(21.0), "21.00");
        assert_eq!(format_amount(0.1 + 0.2), "0.30");
        assert_eq!(format_amount(12.3456), "12.35");
    }
}
