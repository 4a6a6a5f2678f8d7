//! Cart line items.
//!
//! A cart holds two kinds of purchasable lines: one-off products and
//! recurring subscription boxes. They are a tagged union so every operation
//! matches exhaustively on the kind instead of probing for field presence.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use fernway_core::{BoxId, Frequency, ProductId};

// =============================================================================
// Kind & Key
// =============================================================================

/// Discriminant for the two purchasable kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Product,
    SubscriptionBox,
}

/// Composite key identifying one cart entry.
///
/// At most one entry exists per key; a duplicate add merges into the
/// existing entry instead of appending a second one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKey {
    Product(ProductId),
    SubscriptionBox(BoxId),
}

impl ItemKey {
    /// The kind half of the key.
    #[must_use]
    pub const fn kind(&self) -> ItemKind {
        match self {
            Self::Product(_) => ItemKind::Product,
            Self::SubscriptionBox(_) => ItemKind::SubscriptionBox,
        }
    }

    /// The raw catalog id half of the key.
    #[must_use]
    pub const fn raw_id(&self) -> i32 {
        match self {
            Self::Product(id) => id.as_i32(),
            Self::SubscriptionBox(id) => id.as_i32(),
        }
    }
}

impl std::fmt::Display for ItemKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Product(id) => write!(f, "product:{id}"),
            Self::SubscriptionBox(id) => write!(f, "subscription_box:{id}"),
        }
    }
}

// =============================================================================
// Lines
// =============================================================================

/// One physical product line.
///
/// Field values are a snapshot captured from the catalog at add time, not a
/// live reference; reconciliation is what refreshes them later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductLine {
    /// Catalog product id.
    pub id: ProductId,
    /// Display name as of add time.
    pub name: String,
    /// Unit price as of add time; a missing price contributes 0 to totals.
    pub unit_price: Option<Decimal>,
    /// Product image reference.
    pub image_url: Option<String>,
    /// Always >= 1; an update that would reach 0 removes the line instead.
    pub quantity: u32,
    /// Sale unit for loose goods (e.g. "kg").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Upper bound for the quantity stepper in the UI. The store itself does
    /// not clamp to it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_limit: Option<u32>,
}

/// One recurring subscription box line.
///
/// Subscriptions are not quantity-multiplied; the type has no quantity
/// field and always counts as 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionLine {
    /// Catalog box id.
    pub id: BoxId,
    /// Display name as of add time.
    pub name: String,
    /// Price per delivery.
    pub unit_price: Option<Decimal>,
    /// Box image reference.
    pub image_url: Option<String>,
    /// Billing cadence.
    pub frequency: Frequency,
}

/// One purchasable line in the cart.
///
/// Serialized internally tagged on `"kind"`, which is also the wire shape
/// the reconciliation endpoint and the persisted snapshot use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CartItem {
    Product(ProductLine),
    SubscriptionBox(SubscriptionLine),
}

impl CartItem {
    /// The composite key for this line.
    #[must_use]
    pub const fn key(&self) -> ItemKey {
        match self {
            Self::Product(line) => ItemKey::Product(line.id),
            Self::SubscriptionBox(line) => ItemKey::SubscriptionBox(line.id),
        }
    }

    /// The line's kind.
    #[must_use]
    pub const fn kind(&self) -> ItemKind {
        match self {
            Self::Product(_) => ItemKind::Product,
            Self::SubscriptionBox(_) => ItemKind::SubscriptionBox,
        }
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Product(line) => &line.name,
            Self::SubscriptionBox(line) => &line.name,
        }
    }

    /// Unit price, if the catalog supplied one.
    #[must_use]
    pub const fn unit_price(&self) -> Option<Decimal> {
        match self {
            Self::Product(line) => line.unit_price,
            Self::SubscriptionBox(line) => line.unit_price,
        }
    }

    /// Effective quantity: the stored quantity for a product, always 1 for
    /// a subscription box.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        match self {
            Self::Product(line) => line.quantity,
            Self::SubscriptionBox(_) => 1,
        }
    }

    /// Line subtotal: unit price x quantity, 0 when no price is known.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price().unwrap_or_default() * Decimal::from(self.quantity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apples(quantity: u32) -> CartItem {
        CartItem::Product(ProductLine {
            id: ProductId::new(7),
            name: "Apples".to_string(),
            unit_price: Some(Decimal::new(350, 2)),
            image_url: None,
            quantity,
            unit: Some("kg".to_string()),
            stock_limit: Some(10),
        })
    }

    #[test]
    fn test_composite_key() {
        let item = apples(2);
        assert_eq!(item.key(), ItemKey::Product(ProductId::new(7)));
        assert_eq!(item.key().kind(), ItemKind::Product);
        assert_eq!(item.key().raw_id(), 7);
        // Same id, different kind: different key
        assert_ne!(
            ItemKey::Product(ProductId::new(7)).kind(),
            ItemKey::SubscriptionBox(BoxId::new(7)).kind()
        );
    }

    #[test]
    fn test_subscription_quantity_is_fixed() {
        let item = CartItem::SubscriptionBox(SubscriptionLine {
            id: BoxId::new(3),
            name: "Harvest Box".to_string(),
            unit_price: Some(Decimal::new(2900, 2)),
            image_url: None,
            frequency: Frequency::Weekly,
        });
        assert_eq!(item.quantity(), 1);
        assert_eq!(item.line_total(), Decimal::new(2900, 2));
    }

    #[test]
    fn test_line_total_missing_price_is_zero() {
        let item = CartItem::Product(ProductLine {
            id: ProductId::new(9),
            name: "Mystery Jam".to_string(),
            unit_price: None,
            image_url: None,
            quantity: 4,
            unit: None,
            stock_limit: None,
        });
        assert_eq!(item.line_total(), Decimal::ZERO);
    }

    #[test]
    fn test_serde_tagged_on_kind() {
        let json = serde_json::to_value(&apples(2)).unwrap();
        assert_eq!(json["kind"], "product");
        assert_eq!(json["id"], 7);
        assert_eq!(json["quantity"], 2);

        let back: CartItem = serde_json::from_value(json).unwrap();
        assert_eq!(back, apples(2));
    }
}
