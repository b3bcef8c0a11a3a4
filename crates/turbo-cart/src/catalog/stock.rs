//! Stock level types.

use crate::ids::ProductId;
use serde::{Deserialize, Serialize};

/// Available quantity for a product, as reported by the stock service.
///
/// Read once per validating check and never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
    /// Product the record describes.
    pub id: ProductId,
    /// Units currently available.
    pub amount: i64,
}

impl StockRecord {
    pub fn new(id: ProductId, amount: i64) -> Self {
        Self { id, amount }
    }

    /// Check if `requested` units can be held in a cart.
    pub fn can_fulfill(&self, requested: i64) -> bool {
        requested <= self.amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_fulfill_is_inclusive() {
        let stock = StockRecord::new(ProductId::new(1), 5);
        assert!(stock.can_fulfill(5));
        assert!(!stock.can_fulfill(6));
    }

    #[test]
    fn test_empty_stock() {
        let stock = StockRecord::new(ProductId::new(1), 0);
        assert!(!stock.can_fulfill(1));
        assert!(stock.can_fulfill(0));
    }
}
