//! Shopping cart module.
//!
//! Contains the cart entry types and the [`CartStore`] that owns a session's cart.

mod entry;
mod store;

pub use entry::{sanitize_entries, CartEntry, UpdateProductAmount};
pub use store::{CartStore, SharedCartStore};
