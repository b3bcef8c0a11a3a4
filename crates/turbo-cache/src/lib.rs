//! Type-safe Key-Value store for TurboCart.
//!
//! Provides a simple, ergonomic API for keeping serialized snapshots in a
//! key-value store with automatic JSON serialization. Two backends ship with
//! the crate: [`MemoryBackend`] for tests and short-lived sessions, and
//! [`FileBackend`] for snapshots that must survive a restart.
//!
//! # Example
//!
//! ```rust,ignore
//! use turbo_cache::Cache;
//!
//! let cache = Cache::open_dir("./.turbo-cart")?;
//!
//! // Store a value
//! cache.set("@RocketShoes:cart", &entries)?;
//!
//! // Retrieve a value
//! let entries: Option<Vec<CartEntry>> = cache.get("@RocketShoes:cart")?;
//!
//! // Delete a value
//! cache.delete("@RocketShoes:cart")?;
//! ```

mod error;
mod kv;

pub use error::CacheError;
pub use kv::{Cache, FileBackend, KvBackend, MemoryBackend};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, CacheError, KvBackend};
}
