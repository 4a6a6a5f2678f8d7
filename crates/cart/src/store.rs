//! In-memory authoritative cart state.
//!
//! Every mutation and every derived read passes through [`CartStore`].
//! Mutations are infallible: invalid input degrades to the nearest sensible
//! operation (a non-positive quantity removes the line) and persistence
//! failures are logged, never raised. Each completed mutation writes the
//! full cart through to storage before returning.

use rust_decimal::Decimal;
use tracing::{debug, instrument, warn};

use crate::models::{CartItem, ItemKey};
use crate::notify::RemovalNotices;
use crate::reconcile::{Validation, ValidationClient};
use crate::storage::CartStorage;

/// What an add did with the incoming line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// No entry existed for the key; the line was appended.
    Added,
    /// A product entry existed; its quantity absorbed the incoming one.
    Merged,
    /// A subscription box entry existed; the add was a no-op.
    AlreadySubscribed,
}

/// Single source of truth for cart contents.
pub struct CartStore {
    items: Vec<CartItem>,
    storage: CartStorage,
    notices: RemovalNotices,
}

impl CartStore {
    /// Create an empty cart.
    #[must_use]
    pub const fn new(storage: CartStorage, notices: RemovalNotices) -> Self {
        Self {
            items: Vec::new(),
            storage,
            notices,
        }
    }

    /// Restore the last persisted cart, empty if none (or corrupt) exists.
    #[must_use]
    pub fn restore(storage: CartStorage, notices: RemovalNotices) -> Self {
        let items = storage.load();
        Self {
            items,
            storage,
            notices,
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add a line to the cart.
    ///
    /// The item is a snapshot captured from the catalog at add time, not a
    /// live reference. A product already in the cart absorbs the incoming
    /// quantity; adding a subscription box twice means "already subscribed"
    /// and changes nothing.
    pub fn add(&mut self, item: CartItem) -> AddOutcome {
        let key = item.key();
        let outcome = match item {
            CartItem::Product(incoming) => {
                if let Some(existing) = self.items.iter_mut().find_map(|entry| match entry {
                    CartItem::Product(line) if line.id == incoming.id => Some(line),
                    _ => None,
                }) {
                    existing.quantity = existing.quantity.saturating_add(incoming.quantity);
                    AddOutcome::Merged
                } else {
                    self.items.push(CartItem::Product(incoming));
                    AddOutcome::Added
                }
            }
            CartItem::SubscriptionBox(incoming) => {
                if self.contains(&ItemKey::SubscriptionBox(incoming.id)) {
                    AddOutcome::AlreadySubscribed
                } else {
                    self.items.push(CartItem::SubscriptionBox(incoming));
                    AddOutcome::Added
                }
            }
        };

        debug!(%key, ?outcome, "Cart add");
        if outcome != AddOutcome::AlreadySubscribed {
            self.persist();
        }
        outcome
    }

    /// Remove the entry matching `key`, no-op if absent.
    pub fn remove(&mut self, key: &ItemKey) {
        let before = self.items.len();
        self.items.retain(|item| item.key() != *key);
        if self.items.len() != before {
            debug!(%key, "Cart remove");
            self.persist();
        }
    }

    /// Replace the stored quantity for `key`.
    ///
    /// A quantity of zero or below behaves exactly as [`CartStore::remove`]:
    /// the cart never holds a zero-quantity line. Quantities are not clamped
    /// to `stock_limit` here; the UI disables the stepper instead. A
    /// subscription box's quantity is fixed at 1, so a positive update is a
    /// no-op for it.
    pub fn update_quantity(&mut self, key: &ItemKey, new_quantity: i64) {
        if new_quantity <= 0 {
            self.remove(key);
            return;
        }

        let Some(entry) = self.items.iter_mut().find(|item| item.key() == *key) else {
            return;
        };

        match entry {
            CartItem::Product(line) => {
                line.quantity = u32::try_from(new_quantity).unwrap_or(u32::MAX);
                self.persist();
            }
            CartItem::SubscriptionBox(_) => {
                debug!(%key, "Ignoring quantity update for subscription box");
            }
        }
    }

    /// Empty the cart and persist the empty snapshot immediately.
    pub fn clear(&mut self) {
        self.items.clear();
        self.persist();
    }

    // =========================================================================
    // Derived Reads
    // =========================================================================

    /// Cart total: sum of line subtotals. A line without a price counts 0.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.items
            .iter()
            .fold(0, |acc, item| acc.saturating_add(item.quantity()))
    }

    /// Whether an entry exists for `key`.
    #[must_use]
    pub fn contains(&self, key: &ItemKey) -> bool {
        self.items.iter().any(|item| item.key() == *key)
    }

    /// Stored quantity for `key`, `None` when absent.
    #[must_use]
    pub fn quantity_of(&self, key: &ItemKey) -> Option<u32> {
        self.items
            .iter()
            .find(|item| item.key() == *key)
            .map(CartItem::quantity)
    }

    /// The cart lines, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Whether the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines (not units).
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    // =========================================================================
    // Reconciliation
    // =========================================================================

    /// Reconcile the cart against server-held truth.
    ///
    /// Intended to run once per application load, right after
    /// [`CartStore::restore`] produced a non-empty cart. On success the
    /// contents are replaced with exactly the server-confirmed subset, using
    /// the refreshed field values; a removal notice is raised when the
    /// server dropped anything. On failure the cart stands as loaded: no
    /// retry, no user-visible error, an accepted staleness window.
    #[instrument(skip(self, client), fields(items = self.items.len()))]
    pub async fn reconcile(&mut self, client: &ValidationClient) {
        if self.items.is_empty() {
            return;
        }

        match client.validate(&self.items).await {
            Ok(validation) => self.apply_validation(&validation),
            Err(error) => {
                warn!(%error, "Cart reconciliation failed; keeping local snapshot");
            }
        }
    }

    /// Replace the cart with the valid subset of a server verdict.
    pub(crate) fn apply_validation(&mut self, validation: &Validation) {
        let refreshed: Vec<CartItem> = validation
            .items
            .iter()
            .filter(|line| line.is_valid)
            .map(|line| {
                let local = self.items.iter().find(|item| item.key() == line.key());
                line.refresh(local)
            })
            .collect();

        self.items = refreshed;
        self.persist();

        if validation.removed_count > 0 {
            self.notices.raise();
        }
    }

    /// Consume the pending removal notice, if any.
    ///
    /// Idempotent: the first call after a reconciliation that dropped items
    /// returns `true`, every later call returns `false` until the next drop.
    pub fn take_removal_notice(&self) -> bool {
        self.notices.take()
    }

    fn persist(&self) {
        self.storage.save(&self.items);
    }
}
