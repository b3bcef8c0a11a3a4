//! The cart state manager.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::cart::entry::{sanitize_entries, CartEntry, UpdateProductAmount};
use crate::catalog::StockRecord;
use crate::config::CartConfig;
use crate::error::{CartError, ServiceError};
use crate::http::HttpCatalog;
use crate::ids::ProductId;
use crate::notify::{CartOperation, Notification, Notifier, TracingNotifier};
use crate::persistence::SnapshotStore;
use crate::services::{PersistenceStore, StockService};

/// A cart store shared between tasks.
///
/// Hold the lock across a whole operation so the stock check, the state change
/// and the snapshot write happen as one step.
pub type SharedCartStore = Arc<Mutex<CartStore>>;

/// Single source of truth for one session's cart.
///
/// The cart is loaded from the [`PersistenceStore`] once, at construction, and
/// changes only through [`add_product`](Self::add_product),
/// [`remove_product`](Self::remove_product) and
/// [`update_product_amount`](Self::update_product_amount). Each operation is
/// all-or-nothing: on success the new cart is saved, then swapped in and
/// broadcast to subscribers; on failure nothing changes. Either way the
/// [`Notifier`] hears about the outcome.
pub struct CartStore {
    cart: Vec<CartEntry>,
    stock: Arc<dyn StockService>,
    persistence: Arc<dyn PersistenceStore>,
    notifier: Arc<dyn Notifier>,
    updates: watch::Sender<Vec<CartEntry>>,
    stock_timeout: Option<Duration>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("cart", &self.cart)
            .field("stock_timeout", &self.stock_timeout)
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Create a store, loading the saved cart from `persistence`.
    ///
    /// Saved entries that break cart invariants are dropped, and the cleaned
    /// cart is written back. A failed write-back is logged and the store
    /// still starts from the cleaned cart.
    pub fn new(
        stock: Arc<dyn StockService>,
        persistence: Arc<dyn PersistenceStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let loaded = persistence.load();
        let loaded_len = loaded.len();
        let cart = sanitize_entries(loaded);
        if cart.len() != loaded_len {
            if let Err(error) = persistence.save(&cart) {
                warn!(%error, "failed to rewrite cleaned cart snapshot");
            }
        }
        debug!(entries = cart.len(), "cart loaded");
        let (updates, _) = watch::channel(cart.clone());
        Self {
            cart,
            stock,
            persistence,
            notifier,
            updates,
            stock_timeout: None,
        }
    }

    /// Wire the HTTP catalog, the configured snapshot store and a [`TracingNotifier`].
    pub fn from_config(config: &CartConfig) -> Result<Self, ServiceError> {
        let stock = HttpCatalog::from_config(&config.api);
        let persistence = SnapshotStore::from_config(&config.storage)?;
        Ok(Self::new(
            Arc::new(stock),
            Arc::new(persistence),
            Arc::new(TracingNotifier),
        ))
    }

    /// Give up on stock and catalog lookups that take longer than `timeout`.
    pub fn with_stock_timeout(mut self, timeout: Duration) -> Self {
        self.stock_timeout = Some(timeout);
        self
    }

    /// Wrap the store for use from several tasks.
    pub fn into_shared(self) -> SharedCartStore {
        Arc::new(Mutex::new(self))
    }

    /// Current cart contents, in insertion order.
    pub fn cart(&self) -> &[CartEntry] {
        &self.cart
    }

    /// The entry for `product_id`, if present.
    pub fn entry(&self, product_id: ProductId) -> Option<&CartEntry> {
        self.cart.iter().find(|entry| entry.id() == product_id)
    }

    pub fn contains(&self, product_id: ProductId) -> bool {
        self.entry(product_id).is_some()
    }

    /// Number of distinct products.
    pub fn len(&self) -> usize {
        self.cart.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    /// Total units across all entries.
    pub fn item_count(&self) -> i64 {
        self.cart.iter().map(CartEntry::amount).sum()
    }

    /// Amount held per product, for badges on product listings.
    pub fn amounts(&self) -> BTreeMap<ProductId, i64> {
        self.cart
            .iter()
            .map(|entry| (entry.id(), entry.amount()))
            .collect()
    }

    /// Observe every committed cart. The receiver starts at the current cart.
    pub fn subscribe(&self) -> watch::Receiver<Vec<CartEntry>> {
        self.updates.subscribe()
    }

    /// Put one unit of `product_id` in the cart, or one more if it is already there.
    ///
    /// An existing entry goes through [`update_product_amount`](Self::update_product_amount)
    /// with its amount plus one, and reports like an update.
    pub async fn add_product(&mut self, product_id: ProductId) -> Result<(), CartError> {
        debug!(%product_id, "add product");

        if let Some(current) = self.entry(product_id).map(CartEntry::amount) {
            let Some(amount) = current.checked_add(1) else {
                let result = Err(CartError::Unexpected(format!(
                    "amount of product {product_id} cannot grow past {current}"
                )));
                self.report(CartOperation::Add, product_id, &result);
                return result;
            };
            return self
                .update_product_amount(UpdateProductAmount::new(product_id, amount))
                .await;
        }

        let result = self.add_new(product_id).await;
        self.report(CartOperation::Add, product_id, &result);
        result
    }

    /// Remove the entry for `product_id`.
    pub fn remove_product(&mut self, product_id: ProductId) -> Result<(), CartError> {
        debug!(%product_id, "remove product");
        let result = self.remove(product_id);
        self.report(CartOperation::Remove, product_id, &result);
        result
    }

    /// Set the entry for `product_id` to exactly `amount` units.
    pub async fn update_product_amount(
        &mut self,
        update: UpdateProductAmount,
    ) -> Result<(), CartError> {
        debug!(product_id = %update.product_id, amount = update.amount, "update product amount");
        let result = self.set_amount(update).await;
        self.report(CartOperation::UpdateAmount, update.product_id, &result);
        result
    }

    async fn add_new(&mut self, product_id: ProductId) -> Result<(), CartError> {
        let add_failed = |source: ServiceError| CartError::AddProductFailed { product_id, source };

        let product = self
            .bounded(self.stock.get_product(product_id))
            .await
            .map_err(add_failed)?;
        let entry = CartEntry::new(product, 1);

        let stock = self.stock_of(product_id).await.map_err(add_failed)?;
        if !stock.can_fulfill(entry.amount()) {
            return Err(CartError::OutOfStock {
                product_id,
                requested: entry.amount(),
                available: stock.amount,
            });
        }

        let mut next = self.cart.clone();
        next.push(entry);
        self.commit(next).map_err(add_failed)
    }

    fn remove(&mut self, product_id: ProductId) -> Result<(), CartError> {
        let next: Vec<CartEntry> = self
            .cart
            .iter()
            .filter(|entry| entry.id() != product_id)
            .cloned()
            .collect();

        if next.len() + 1 != self.cart.len() {
            return Err(CartError::RemoveProductFailed {
                product_id,
                source: None,
            });
        }

        self.commit(next)
            .map_err(|source| CartError::RemoveProductFailed {
                product_id,
                source: Some(source),
            })
    }

    async fn set_amount(&mut self, update: UpdateProductAmount) -> Result<(), CartError> {
        let UpdateProductAmount { product_id, amount } = update;
        let update_failed = |source: ServiceError| CartError::UpdateFailed {
            product_id,
            source: Some(source),
        };

        // Updating a product that is not in the cart fails like a removal would.
        if !self.contains(product_id) {
            return Err(CartError::UpdateFailed {
                product_id,
                source: None,
            });
        }

        let stock = self.stock_of(product_id).await.map_err(update_failed)?;
        if !stock.can_fulfill(amount) {
            return Err(CartError::OutOfStock {
                product_id,
                requested: amount,
                available: stock.amount,
            });
        }
        if amount < 1 {
            return Err(CartError::InvalidAmount { product_id, amount });
        }

        let next = self
            .cart
            .iter()
            .map(|entry| {
                if entry.id() == product_id {
                    entry.with_amount(amount)
                } else {
                    entry.clone()
                }
            })
            .collect();
        self.commit(next).map_err(update_failed)
    }

    /// Stock of `product_id`, read fresh from the stock service.
    async fn stock_of(&self, product_id: ProductId) -> Result<StockRecord, ServiceError> {
        let record = self.bounded(self.stock.get_stock(product_id)).await?;
        if record.id != product_id {
            return Err(ServiceError::Mismatch {
                requested: product_id,
                received: record.id,
            });
        }
        Ok(record)
    }

    async fn bounded<T>(
        &self,
        lookup: impl std::future::Future<Output = Result<T, ServiceError>>,
    ) -> Result<T, ServiceError> {
        match self.stock_timeout {
            Some(limit) => tokio::time::timeout(limit, lookup)
                .await
                .map_err(|_| ServiceError::Timeout(limit))?,
            None => lookup.await,
        }
    }

    /// Save `next`, then make it the current cart and broadcast it.
    fn commit(&mut self, next: Vec<CartEntry>) -> Result<(), ServiceError> {
        self.persistence.save(&next)?;
        self.cart = next;
        self.updates.send_replace(self.cart.clone());
        info!(entries = self.cart.len(), items = self.item_count(), "cart committed");
        Ok(())
    }

    fn report(&self, operation: CartOperation, product_id: ProductId, result: &Result<(), CartError>) {
        let notification = match result {
            Ok(()) => Notification::success(operation, product_id),
            Err(error) => {
                warn!(%operation, %product_id, %error, "cart operation rejected");
                Notification::failure(operation, product_id, error)
            }
        };
        self.notifier.notify(notification);
    }
}
