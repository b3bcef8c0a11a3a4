//! Cart error types.

use std::time::Duration;

use thiserror::Error;

use crate::ids::ProductId;

/// Failures reported by the collaborators behind a [`CartStore`](crate::CartStore):
/// the catalog/stock service and the snapshot store.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The catalog does not know the product.
    #[error("Product not found: {0}")]
    NotFound(ProductId),

    /// The stock lookup did not answer in time.
    #[error("Stock lookup timed out after {0:?}")]
    Timeout(Duration),

    /// The service answered about a different product than the one asked for.
    #[error("Stock record for product {received} returned when {requested} was requested")]
    Mismatch {
        requested: ProductId,
        received: ProductId,
    },

    /// Catalog or stock request failed.
    #[error("Catalog request failed: {0}")]
    Fetch(#[from] turbo_data::FetchError),

    /// Snapshot store failure.
    #[error("Storage error: {0}")]
    Storage(#[from] turbo_cache::CacheError),

    /// Any other collaborator failure.
    #[error("{0}")]
    Other(String),
}

/// Why a cart operation was rejected.
///
/// Every variant leaves the cart exactly as it was before the call.
#[derive(Error, Debug)]
pub enum CartError {
    /// The requested amount exceeds what the stock service reports as available.
    #[error("Insufficient stock for {product_id}: requested {requested}, available {available}")]
    OutOfStock {
        product_id: ProductId,
        requested: i64,
        available: i64,
    },

    /// Amounts below one are rejected rather than treated as a removal.
    #[error("Invalid amount {amount} for product {product_id}")]
    InvalidAmount { product_id: ProductId, amount: i64 },

    /// Product lookup, stock lookup or persistence failed while adding.
    #[error("Failed to add product {product_id}")]
    AddProductFailed {
        product_id: ProductId,
        #[source]
        source: ServiceError,
    },

    /// The product is not in the cart, or the snapshot could not be written.
    /// `source` is `None` when the product was absent.
    #[error("Failed to remove product {product_id}")]
    RemoveProductFailed {
        product_id: ProductId,
        #[source]
        source: Option<ServiceError>,
    },

    /// The product is not in the cart, or a lookup or write failed.
    /// `source` is `None` when the product was absent.
    #[error("Failed to update amount of product {product_id}")]
    UpdateFailed {
        product_id: ProductId,
        #[source]
        source: Option<ServiceError>,
    },

    /// Anything the taxonomy above does not classify.
    #[error("Unexpected cart failure: {0}")]
    Unexpected(String),
}

impl CartError {
    /// Whether this failure is a stock rejection, as opposed to a generic failure.
    pub fn is_out_of_stock(&self) -> bool {
        matches!(self, CartError::OutOfStock { .. })
    }

    /// The product the failed operation targeted, when known.
    pub fn product_id(&self) -> Option<ProductId> {
        match self {
            CartError::OutOfStock { product_id, .. }
            | CartError::InvalidAmount { product_id, .. }
            | CartError::AddProductFailed { product_id, .. }
            | CartError::RemoveProductFailed { product_id, .. }
            | CartError::UpdateFailed { product_id, .. } => Some(*product_id),
            CartError::Unexpected(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_out_of_stock_message() {
        let err = CartError::OutOfStock {
            product_id: ProductId::new(1),
            requested: 2,
            available: 1,
        };
        assert!(err.is_out_of_stock());
        assert_eq!(
            err.to_string(),
            "Insufficient stock for 1: requested 2, available 1"
        );
    }

    #[test]
    fn test_add_failure_exposes_source() {
        let err = CartError::AddProductFailed {
            product_id: ProductId::new(9),
            source: ServiceError::NotFound(ProductId::new(9)),
        };
        assert!(!err.is_out_of_stock());
        assert_eq!(err.product_id(), Some(ProductId::new(9)));
        assert_eq!(
            err.source().map(|s| s.to_string()),
            Some("Product not found: 9".to_string())
        );
    }

    #[test]
    fn test_remove_failure_without_source() {
        let err = CartError::RemoveProductFailed {
            product_id: ProductId::new(2),
            source: None,
        };
        assert!(err.source().is_none());
    }
}
