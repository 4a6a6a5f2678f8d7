//! Fernway cart subsystem.
//!
//! Client-side cart state and inventory reconciliation for the Fernway
//! storefront: a local collection of purchasable lines (products and
//! subscription boxes), persisted across sessions, reconciled once per
//! application load against server-held availability and pricing.
//!
//! # Architecture
//!
//! - [`store::CartStore`] - authoritative in-memory cart state; every
//!   mutation and derived read goes through it
//! - [`storage`] - durable key-value persistence (write-through on every
//!   mutation, fail-safe on corrupt snapshots)
//! - [`reconcile::ValidationClient`] - posts the cart to the reconciliation
//!   endpoint and returns the server-corrected view
//! - [`notify::RemovalNotices`] - one-shot "items were silently removed"
//!   signal, delivered to the next cart view that asks
//!
//! # Example
//!
//! ```rust,ignore
//! use fernway_cart::config::CartConfig;
//! use fernway_cart::notify::RemovalNotices;
//! use fernway_cart::reconcile::ValidationClient;
//! use fernway_cart::storage::{CartStorage, FileStore, MemoryStore};
//! use fernway_cart::store::CartStore;
//! use std::sync::Arc;
//!
//! let config = CartConfig::from_env()?;
//! let storage = CartStorage::new(Arc::new(FileStore::new(&config.storage_dir)));
//! let notices = RemovalNotices::new(Arc::new(MemoryStore::new()));
//! let mut cart = CartStore::restore(storage, notices);
//!
//! // Once per application load, never per mutation
//! if !cart.is_empty() {
//!     let client = ValidationClient::new(&config);
//!     cart.reconcile(&client).await;
//! }
//! ```
//!
//! # Consistency model
//!
//! Single-threaded, event-driven use: mutations take `&mut self` and run to
//! completion; there is no locking because there is nothing to lock against.
//! Two processes sharing a storage directory overwrite each other's snapshot
//! last-write-wins; cross-process merge is explicitly not attempted. The
//! cart outlives any one identity: callers owning the auth boundary must
//! call [`store::CartStore::clear`] on logout if carts must not leak
//! between users on a shared device.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod models;
pub mod notify;
pub mod reconcile;
pub mod storage;
pub mod store;
