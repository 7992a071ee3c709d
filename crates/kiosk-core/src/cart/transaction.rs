//! Checkout transaction record.

use serde::{Deserialize, Serialize};

/// Reference code and amount shown to the customer for a bank transfer.
///
/// Derived at checkout from the cart total; cleared on confirmation or when
/// the cart is cleared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Best-effort unique reference code.
    pub code: String,
    /// Cart total at checkout time, unrounded.
    pub amount: f64,
}

/// Source of transaction reference codes.
///
/// Codes are time-based plus a random suffix. They are neither
/// cryptographically strong nor guaranteed unique; two checkouts in the
/// same millisecond may in principle collide.
pub trait TransactionCodeGenerator: Send + Sync {
    fn next_code(&self) -> String;
}
