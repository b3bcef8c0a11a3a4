//! Product catalog module.
//!
//! Contains the product and stock types read from the storefront catalog.

mod product;
mod stock;

pub use product::Product;
pub use stock::StockRecord;
