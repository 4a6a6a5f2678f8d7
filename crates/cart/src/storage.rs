//! Durable local persistence for the cart.
//!
//! The browser-profile storage of the original storefront maps onto a
//! string-keyed [`KeyValueStore`]: [`FileStore`] is the durable channel
//! (survives restarts, one file per key) and [`MemoryStore`] is the
//! session-scoped channel (lives for the process). [`CartStorage`] sits on
//! top of a store handle and owns (de)serialization of the cart snapshot.
//!
//! Persistence is best-effort by design: every failure mode degrades to
//! "keep the in-memory state", so the trait surface is infallible and
//! implementations log and swallow I/O errors instead of propagating them.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::warn;

use crate::models::CartItem;

/// Storage key the serialized cart snapshot lives under.
pub const CART_KEY: &str = "cart";

// =============================================================================
// KeyValueStore
// =============================================================================

/// String-keyed store the cart subsystem persists through.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Replace the entire value stored under `key`.
    fn set(&self, key: &str, value: &str);

    /// Delete the value stored under `key`, no-op if absent.
    fn remove(&self, key: &str);
}

/// File-backed store: one file per key under a fixed directory.
///
/// Durable across restarts. Writes replace the whole file; two processes
/// sharing a directory overwrite each other last-write-wins.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`, creating the directory if needed.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        if let Err(error) = fs::create_dir_all(&dir) {
            warn!(%error, dir = %dir.display(), "Failed to create storage directory");
        }
        Self { dir }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Some(value),
            Err(error) if error.kind() == ErrorKind::NotFound => None,
            Err(error) => {
                warn!(%error, key, "Failed to read stored value");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) {
        if let Err(error) = fs::write(self.path_for(key), value) {
            warn!(%error, key, "Failed to write stored value");
        }
    }

    fn remove(&self, key: &str) {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => {}
            Err(error) if error.kind() == ErrorKind::NotFound => {}
            Err(error) => warn!(%error, key, "Failed to remove stored value"),
        }
    }
}

/// In-memory store with process lifetime.
///
/// Stands in for session-scoped storage (survives view changes, not a
/// restart) and doubles as the test double for the durable channel. The
/// mutex only provides interior mutability behind a shared handle; the
/// subsystem itself is single-threaded.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

// =============================================================================
// CartStorage
// =============================================================================

/// Cart snapshot persistence over a [`KeyValueStore`].
///
/// Write-through: [`CartStorage::save`] runs after every completed mutation
/// and replaces the entire stored value.
#[derive(Clone)]
pub struct CartStorage {
    store: Arc<dyn KeyValueStore>,
}

impl CartStorage {
    /// Create storage over the given store handle.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load the last persisted snapshot.
    ///
    /// A missing value is an empty cart. A corrupt value is also an empty
    /// cart: the snapshot is discarded so the next save starts clean, and
    /// the failure is logged, not surfaced.
    #[must_use]
    pub fn load(&self) -> Vec<CartItem> {
        let Some(raw) = self.store.get(CART_KEY) else {
            return Vec::new();
        };

        match serde_json::from_str(&raw) {
            Ok(items) => items,
            Err(error) => {
                warn!(%error, "Discarding corrupt cart snapshot");
                self.store.remove(CART_KEY);
                Vec::new()
            }
        }
    }

    /// Serialize and store the full cart, replacing the previous value.
    pub fn save(&self, items: &[CartItem]) {
        match serde_json::to_string(items) {
            Ok(raw) => self.store.set(CART_KEY, &raw),
            Err(error) => warn!(%error, "Failed to serialize cart snapshot"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProductLine;
    use fernway_core::ProductId;
    use rust_decimal::Decimal;

    fn carrots() -> CartItem {
        CartItem::Product(ProductLine {
            id: ProductId::new(1),
            name: "Carrots".to_string(),
            unit_price: Some(Decimal::new(250, 2)),
            image_url: None,
            quantity: 3,
            unit: Some("kg".to_string()),
            stock_limit: None,
        })
    }

    #[test]
    fn test_load_missing_is_empty() {
        let storage = CartStorage::new(Arc::new(MemoryStore::new()));
        assert!(storage.load().is_empty());
    }

    #[test]
    fn test_save_load_round_trip() {
        let storage = CartStorage::new(Arc::new(MemoryStore::new()));
        let cart = vec![carrots()];

        storage.save(&cart);
        // Simulates a reload: a fresh load over the same store
        assert_eq!(storage.load(), cart);
    }

    #[test]
    fn test_corrupt_snapshot_discarded() {
        let store = Arc::new(MemoryStore::new());
        store.set(CART_KEY, "{not json[");

        let storage = CartStorage::new(Arc::clone(&store) as Arc<dyn KeyValueStore>);
        assert!(storage.load().is_empty());
        // The corrupt value is erased, not left to fail again
        assert!(store.get(CART_KEY).is_none());
    }

    #[test]
    fn test_save_replaces_whole_value() {
        let store = Arc::new(MemoryStore::new());
        let storage = CartStorage::new(Arc::clone(&store) as Arc<dyn KeyValueStore>);

        storage.save(&[carrots()]);
        storage.save(&[]);
        assert_eq!(store.get(CART_KEY).as_deref(), Some("[]"));
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = std::env::temp_dir().join(format!("fernway-cart-{}", uuid::Uuid::new_v4()));
        let store = FileStore::new(&dir);

        assert!(store.get("cart").is_none());
        store.set("cart", "[1,2,3]");
        assert_eq!(store.get("cart").as_deref(), Some("[1,2,3]"));

        store.remove("cart");
        assert!(store.get("cart").is_none());
        // Removing again is a no-op, not an error
        store.remove("cart");

        let _ = fs::remove_dir_all(dir);
    }
}
