//! One-shot removal notices.
//!
//! Reconciliation can silently drop cart items well before any cart view
//! exists to tell the user about it. [`RemovalNotices`] carries that signal
//! across the gap: the notice is parked in the session-scoped store when
//! raised and delivered to whichever consumer asks first, so delivery is
//! at-least-once within the session regardless of mount order.

use std::sync::Arc;

use tracing::debug;

use crate::storage::KeyValueStore;

/// Storage key the pending notice lives under.
pub const NOTICE_KEY: &str = "cart.removal-notice";

/// Latch for the "items were silently removed" signal.
///
/// Consumption is idempotent: [`RemovalNotices::take`] clears the notice,
/// and a second take without an intervening raise reports nothing pending.
#[derive(Clone)]
pub struct RemovalNotices {
    store: Arc<dyn KeyValueStore>,
}

impl RemovalNotices {
    /// Create a notice latch over the given session-scoped store.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Raise the notice. Raising an already-raised notice changes nothing.
    pub fn raise(&self) {
        debug!("Raising cart removal notice");
        self.store.set(NOTICE_KEY, "true");
    }

    /// Consume the notice: reports whether one was pending and clears it.
    pub fn take(&self) -> bool {
        let pending = self.store.get(NOTICE_KEY).is_some();
        if pending {
            self.store.remove(NOTICE_KEY);
        }
        pending
    }
}
