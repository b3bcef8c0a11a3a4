//! Storefront cart state for TurboCart.
//!
//! This crate owns the shopping cart of one browsing session:
//!
//! - **Cart**: [`CartStore`] with add / remove / update-amount operations
//! - **Catalog**: products and stock records read from the storefront API
//! - **Persistence**: cart snapshots kept in a `turbo-cache` key-value store
//! - **Notifications**: user-facing outcome messages for every operation
//!
//! Every operation validates against live stock, and either commits (snapshot
//! written, subscribers updated) or leaves the cart untouched.
//!
//! # Example
//!
//! ```rust,ignore
//! use turbo_cart::prelude::*;
//!
//! let config = CartConfig::load("turbo-cart.toml")?;
//! turbo_cart::telemetry::init_tracing(&config.log)?;
//!
//! let mut store = CartStore::from_config(&config)?;
//!
//! store.add_product(ProductId::new(1)).await?;
//! store
//!     .update_product_amount(UpdateProductAmount::new(ProductId::new(1), 3))
//!     .await?;
//! store.remove_product(ProductId::new(1))?;
//!
//! println!("{} items", store.item_count());
//! ```

pub mod error;
pub mod ids;

pub mod cart;
pub mod catalog;
pub mod config;
pub mod http;
pub mod notify;
pub mod persistence;
pub mod services;
pub mod telemetry;

pub use cart::{CartEntry, CartStore, SharedCartStore, UpdateProductAmount};
pub use error::{CartError, ServiceError};
pub use ids::ProductId;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{CartError, ServiceError};
    pub use crate::ids::ProductId;

    // Cart
    pub use crate::cart::{CartEntry, CartStore, SharedCartStore, UpdateProductAmount};

    // Catalog
    pub use crate::catalog::{Product, StockRecord};

    // Collaborators
    pub use crate::http::HttpCatalog;
    pub use crate::notify::{
        CartOperation, Notification, NotificationKind, Notifier, QueueNotifier, TracingNotifier,
    };
    pub use crate::persistence::SnapshotStore;
    pub use crate::services::{PersistenceStore, StockService};

    // Configuration
    pub use crate::config::CartConfig;
}
