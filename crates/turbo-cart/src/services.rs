//! Collaborator interfaces consumed by [`CartStore`](crate::CartStore).

use async_trait::async_trait;

use crate::cart::CartEntry;
use crate::catalog::{Product, StockRecord};
use crate::error::ServiceError;
use crate::ids::ProductId;

/// Remote catalog and stock lookups.
///
/// Any error is treated by the cart as a generic failure of the operation in
/// progress, never as an out-of-stock rejection.
#[async_trait]
pub trait StockService: Send + Sync {
    /// Current available quantity for `product_id`.
    async fn get_stock(&self, product_id: ProductId) -> Result<StockRecord, ServiceError>;

    /// Catalog metadata for `product_id`.
    async fn get_product(&self, product_id: ProductId) -> Result<Product, ServiceError>;
}

/// Durable home of the cart snapshot.
pub trait PersistenceStore: Send + Sync {
    /// Read the last saved cart.
    ///
    /// Missing or unreadable snapshots yield an empty cart; this never fails.
    fn load(&self) -> Vec<CartEntry>;

    /// Replace the saved cart with `cart`. Must have landed when it returns.
    fn save(&self, cart: &[CartEntry]) -> Result<(), ServiceError>;
}
