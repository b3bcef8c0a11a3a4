//! Cart entry types.

use std::collections::HashSet;

use crate::catalog::Product;
use crate::ids::ProductId;
use serde::{Deserialize, Serialize};

/// A product held in the cart together with its amount.
///
/// Serializes flat, as `{ "id", "amount", ...product attributes }`, which is
/// the shape of the persisted snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartEntry {
    #[serde(flatten)]
    product: Product,
    amount: i64,
}

impl CartEntry {
    /// Pair `product` with `amount`.
    ///
    /// A catalog `amount` attribute is dropped; the cart amount always wins.
    pub fn new(mut product: Product, amount: i64) -> Self {
        product.attributes.remove("amount");
        Self { product, amount }
    }

    /// Identifier of the held product.
    pub fn id(&self) -> ProductId {
        self.product.id
    }

    /// Units of the product in the cart.
    pub fn amount(&self) -> i64 {
        self.amount
    }

    /// The held product.
    pub fn product(&self) -> &Product {
        &self.product
    }

    /// A copy of this entry holding `amount` units.
    pub fn with_amount(&self, amount: i64) -> Self {
        Self {
            product: self.product.clone(),
            amount,
        }
    }
}

/// Arguments of an amount update, as sent by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductAmount {
    pub product_id: ProductId,
    pub amount: i64,
}

impl UpdateProductAmount {
    pub fn new(product_id: ProductId, amount: i64) -> Self {
        Self { product_id, amount }
    }
}

/// Drop snapshot entries that break cart invariants.
///
/// Keeps the first entry for each product and discards entries holding less
/// than one unit. Order is preserved.
pub fn sanitize_entries(entries: Vec<CartEntry>) -> Vec<CartEntry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|entry| {
            if entry.amount < 1 {
                tracing::warn!(product_id = %entry.id(), amount = entry.amount, "dropping entry below one unit");
                return false;
            }
            if !seen.insert(entry.id()) {
                tracing::warn!(product_id = %entry.id(), "dropping duplicate cart entry");
                return false;
            }
            true
        })
        .collect()
}
