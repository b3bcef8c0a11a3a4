//! [`PersistenceStore`] over a `turbo-cache` key-value store.

use turbo_cache::{Cache, CacheError};

use crate::cart::CartEntry;
use crate::config::{StorageConfig, DEFAULT_STORAGE_KEY};
use crate::error::ServiceError;
use crate::services::PersistenceStore;

/// Keeps the cart as one JSON array under a fixed key.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    cache: Cache,
    key: String,
}

impl SnapshotStore {
    pub fn new(cache: Cache, key: impl Into<String>) -> Self {
        Self {
            cache,
            key: key.into(),
        }
    }

    /// Process-local store under the default key.
    pub fn in_memory() -> Self {
        Self::new(Cache::in_memory(), DEFAULT_STORAGE_KEY)
    }

    /// File-backed store when `storage.path` is set, in-memory otherwise.
    pub fn from_config(storage: &StorageConfig) -> Result<Self, CacheError> {
        let cache = match &storage.path {
            Some(path) => Cache::open_dir(path)?,
            None => Cache::in_memory(),
        };
        Ok(Self::new(cache, storage.key.clone()))
    }

    /// The storage key the snapshot lives under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The underlying cache.
    pub fn cache(&self) -> &Cache {
        &self.cache
    }
}

impl PersistenceStore for SnapshotStore {
    fn load(&self) -> Vec<CartEntry> {
        match self.cache.get::<Vec<CartEntry>>(&self.key) {
            Ok(Some(cart)) => cart,
            Ok(None) => Vec::new(),
            Err(error) => {
                tracing::warn!(key = %self.key, %error, "unreadable cart snapshot, starting empty");
                Vec::new()
            }
        }
    }

    fn save(&self, cart: &[CartEntry]) -> Result<(), ServiceError> {
        self.cache.set(&self.key, cart)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Product;
    use crate::ids::ProductId;
    use serde_json::json;

    fn entry(id: u64, amount: i64) -> CartEntry {
        CartEntry::new(
            Product::new(ProductId::new(id)).with_attribute("title", "Shoe"),
            amount,
        )
    }

    #[test]
    fn test_missing_snapshot_is_empty() {
        assert!(SnapshotStore::in_memory().load().is_empty());
    }

    #[test]
    fn test_save_then_load_roundtrips() {
        let store = SnapshotStore::in_memory();
        let cart = vec![entry(1, 2), entry(5, 1)];

        store.save(&cart).unwrap();

        assert_eq!(store.load(), cart);
    }

    #[test]
    fn test_snapshot_shape_on_disk() {
        let store = SnapshotStore::in_memory();
        store.save(&[entry(1, 2)]).unwrap();

        let raw: serde_json::Value = store.cache().get(store.key()).unwrap().unwrap();
        assert_eq!(raw, json!([{ "id": 1, "amount": 2, "title": "Shoe" }]));
    }

    #[test]
    fn test_float_attributes_roundtrip_exactly() {
        let store = SnapshotStore::in_memory();
        let cart: Vec<CartEntry> = [
            1.0715660391465826e-75,
            -1.81996730402717e-179,
            -1.603964615428183e143,
            -9.643915712060552e-234,
            179.9,
        ]
        .into_iter()
        .enumerate()
        .map(|(i, price)| {
            let product = Product::new(ProductId::new(i as u64 + 1)).with_attribute("price", price);
            CartEntry::new(product, 1)
        })
        .collect();

        store.save(&cart).unwrap();
        let loaded = store.load();

        assert_eq!(loaded, cart);
        for (saved, read) in cart.iter().zip(&loaded) {
            let bits = |e: &CartEntry| e.product().attribute("price").and_then(|v| v.as_f64()).map(f64::to_bits);
            assert_eq!(bits(read), bits(saved));
        }
    }

    #[test]
    fn test_malformed_snapshot_is_empty() {
        let store = SnapshotStore::in_memory();
        store.cache().set_raw(store.key(), b"[{\"id\": \"oops\"").unwrap();

        assert!(store.load().is_empty());
    }

    #[test]
    fn test_wrong_shape_snapshot_is_empty() {
        let store = SnapshotStore::in_memory();
        store.cache().set(store.key(), &json!({ "cart": [] })).unwrap();

        assert!(store.load().is_empty());
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            key: "cart:test".to_string(),
            path: Some(dir.path().to_path_buf()),
        };

        SnapshotStore::from_config(&config)
            .unwrap()
            .save(&[entry(3, 4)])
            .unwrap();

        let reopened = SnapshotStore::from_config(&config).unwrap();
        assert_eq!(reopened.key(), "cart:test");
        assert_eq!(reopened.load(), vec![entry(3, 4)]);
    }
}
