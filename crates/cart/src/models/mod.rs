//! Domain models for the cart subsystem.

mod item;

pub use item::{CartItem, ItemKey, ItemKind, ProductLine, SubscriptionLine};
