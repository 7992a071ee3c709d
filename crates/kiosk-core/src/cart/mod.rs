//! Cart domain module.
//!
//! # Module Structure
//!
//! - `line_item`: `Product`, `LineItem` and display formatting
//! - `transaction`: `TransactionRecord` and its code generator port
//! - `model`: The cart state machine (`Cart`, `CartEffect`)
//! - `repository`: Persistence port (`CartRepository`)

mod line_item;
mod model;
mod repository;
mod transaction;

pub use line_item::{LineItem, Product, format_amount, validate_items};
pub use model::{Cart, CartEffect};
pub use repository::CartRepository;
pub use transaction::{TransactionCodeGenerator, TransactionRecord};
