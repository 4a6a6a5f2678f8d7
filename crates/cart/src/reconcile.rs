//! Cart reconciliation against server-held truth.
//!
//! The cart is a cache of catalog data captured at add time; prices change,
//! stock runs out, boxes get discontinued. [`ValidationClient`] posts the
//! full cart to the storefront API once per application load and gets back
//! the corrected view: which lines are still valid and their refreshed
//! display fields. Applying the result is the store's job
//! (`CartStore::reconcile`); this module owns the wire contract.

use std::sync::Arc;

use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use fernway_core::{BoxId, Frequency, ProductId};

use crate::config::CartConfig;
use crate::models::{CartItem, ItemKey, ItemKind, ProductLine, SubscriptionLine};

/// Errors that can occur when calling the reconciliation endpoint.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint answered with a non-success status.
    #[error("Reconciliation endpoint returned {0}")]
    Status(reqwest::StatusCode),

    /// Response body did not parse.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

// =============================================================================
// Wire Types
// =============================================================================

/// Request body: the full current cart.
#[derive(Debug, Serialize)]
struct ValidateRequest<'a> {
    items: &'a [CartItem],
}

/// One line of the server's verdict.
///
/// Identity and the validity flag are always present. The refreshed display
/// fields are only guaranteed for valid lines; an invalid line may carry
/// nothing beyond `kind`, `item_id` and `is_valid`.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidatedLine {
    pub kind: ItemKind,
    pub item_id: i32,
    pub is_valid: bool,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub unit_price: Option<Decimal>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub stock_limit: Option<u32>,
    #[serde(default)]
    pub frequency: Option<Frequency>,
}

impl ValidatedLine {
    /// Composite key this verdict refers to.
    #[must_use]
    pub const fn key(&self) -> ItemKey {
        match self.kind {
            ItemKind::Product => ItemKey::Product(ProductId::new(self.item_id)),
            ItemKind::SubscriptionBox => ItemKey::SubscriptionBox(BoxId::new(self.item_id)),
        }
    }

    /// Build the refreshed cart line for a valid verdict.
    ///
    /// Server-supplied fields win over the locally held snapshot; the local
    /// values only fill fields the server omitted. This is what corrects
    /// silent price/name drift rather than just availability.
    #[must_use]
    pub fn refresh(&self, local: Option<&CartItem>) -> CartItem {
        match self.kind {
            ItemKind::Product => {
                let prior = match local {
                    Some(CartItem::Product(line)) => Some(line),
                    _ => None,
                };
                CartItem::Product(ProductLine {
                    id: ProductId::new(self.item_id),
                    name: self
                        .name
                        .clone()
                        .or_else(|| prior.map(|p| p.name.clone()))
                        .unwrap_or_default(),
                    unit_price: self.unit_price.or_else(|| prior.and_then(|p| p.unit_price)),
                    image_url: self
                        .image_url
                        .clone()
                        .or_else(|| prior.and_then(|p| p.image_url.clone())),
                    quantity: self
                        .quantity
                        .or_else(|| prior.map(|p| p.quantity))
                        .unwrap_or(1)
                        .max(1),
                    unit: self.unit.clone().or_else(|| prior.and_then(|p| p.unit.clone())),
                    stock_limit: self.stock_limit.or_else(|| prior.and_then(|p| p.stock_limit)),
                })
            }
            ItemKind::SubscriptionBox => {
                let prior = match local {
                    Some(CartItem::SubscriptionBox(line)) => Some(line),
                    _ => None,
                };
                CartItem::SubscriptionBox(SubscriptionLine {
                    id: BoxId::new(self.item_id),
                    name: self
                        .name
                        .clone()
                        .or_else(|| prior.map(|p| p.name.clone()))
                        .unwrap_or_default(),
                    unit_price: self.unit_price.or_else(|| prior.and_then(|p| p.unit_price)),
                    image_url: self
                        .image_url
                        .clone()
                        .or_else(|| prior.and_then(|p| p.image_url.clone())),
                    frequency: self
                        .frequency
                        .or_else(|| prior.map(|p| p.frequency))
                        .unwrap_or_default(),
                })
            }
        }
    }
}

/// The server's corrected view of the cart.
#[derive(Debug, Clone, Deserialize)]
pub struct Validation {
    /// Per-submitted-item verdicts.
    pub items: Vec<ValidatedLine>,
    /// How many submitted items the server dropped.
    pub removed_count: u32,
}

// =============================================================================
// ValidationClient
// =============================================================================

/// Client for the cart reconciliation endpoint.
///
/// Runs once per application load, not per mutation. There is no timeout
/// and no retry: a slow call only delays the correction, and a failed call
/// leaves the locally held cart standing.
#[derive(Clone)]
pub struct ValidationClient {
    inner: Arc<ValidationClientInner>,
}

struct ValidationClientInner {
    client: reqwest::Client,
    endpoint: String,
    api_token: Option<SecretString>,
}

impl ValidationClient {
    /// Create a new reconciliation client.
    #[must_use]
    pub fn new(config: &CartConfig) -> Self {
        Self {
            inner: Arc::new(ValidationClientInner {
                client: reqwest::Client::new(),
                endpoint: config.validate_endpoint(),
                api_token: config.api_token.clone(),
            }),
        }
    }

    /// Submit the full cart and return the server's corrected view.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the endpoint answers with a
    /// non-success status, or the response body does not parse.
    #[instrument(skip(self, items), fields(items = items.len()))]
    pub async fn validate(&self, items: &[CartItem]) -> Result<Validation, ValidationError> {
        let mut request = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .json(&ValidateRequest { items });

        if let Some(token) = &self.inner.api_token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();

        // Body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Reconciliation endpoint returned non-success status"
            );
            return Err(ValidationError::Status(status));
        }

        let validation: Validation = match serde_json::from_str(&response_text) {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %response_text.chars().take(500).collect::<String>(),
                    "Failed to parse reconciliation response"
                );
                return Err(ValidationError::Parse(e));
            }
        };

        debug!(
            verdicts = validation.items.len(),
            removed = validation.removed_count,
            "Cart reconciled"
        );
        Ok(validation)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_line_parses_with_identity_only() {
        let line: ValidatedLine =
            serde_json::from_str(r#"{"kind":"subscription_box","item_id":3,"is_valid":false}"#)
                .unwrap();
        assert!(!line.is_valid);
        assert_eq!(line.key(), ItemKey::SubscriptionBox(BoxId::new(3)));
        assert!(line.name.is_none());
    }

    #[test]
    fn test_refresh_prefers_server_fields() {
        let local = CartItem::Product(ProductLine {
            id: ProductId::new(7),
            name: "Apples".to_string(),
            unit_price: Some(Decimal::new(150, 0)),
            image_url: Some("apples.webp".to_string()),
            quantity: 2,
            unit: Some("kg".to_string()),
            stock_limit: Some(10),
        });
        let line: ValidatedLine = serde_json::from_str(
            r#"{"kind":"product","item_id":7,"is_valid":true,"name":"Apples","unit_price":"175","quantity":2}"#,
        )
        .unwrap();

        let refreshed = line.refresh(Some(&local));
        let CartItem::Product(product) = refreshed else {
            panic!("expected a product line");
        };
        assert_eq!(product.unit_price, Some(Decimal::new(175, 0)));
        assert_eq!(product.quantity, 2);
        // Fields the server omitted fall back to the local snapshot
        assert_eq!(product.image_url.as_deref(), Some("apples.webp"));
        assert_eq!(product.unit.as_deref(), Some("kg"));
        assert_eq!(product.stock_limit, Some(10));
    }

    #[test]
    fn test_refresh_without_local_uses_defaults() {
        let line: ValidatedLine = serde_json::from_str(
            r#"{"kind":"product","item_id":11,"is_valid":true,"name":"Kale"}"#,
        )
        .unwrap();

        let refreshed = line.refresh(None);
        assert_eq!(refreshed.name(), "Kale");
        assert_eq!(refreshed.quantity(), 1);
        assert_eq!(refreshed.unit_price(), None);
    }

    #[test]
    fn test_validation_parses_removed_count() {
        let validation: Validation = serde_json::from_str(
            r#"{"items":[{"kind":"product","item_id":9,"is_valid":true,"name":"Eggs"}],"removed_count":1}"#,
        )
        .unwrap();
        assert_eq!(validation.items.len(), 1);
        assert_eq!(validation.removed_count, 1);
    }
}
