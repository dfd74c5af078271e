//! Cart line items.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::catalog::{Flavor, Product};

/// Locally-generated identifier for a cart line item.
///
/// Distinct from the product/flavor ids the item references: catalog ids
/// may churn under the cart, while the `CartLineId` stays stable for the
/// lifetime of the line item and is the only identity used for removal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartLineId(String);

impl CartLineId {
    /// Wrap an already-generated id.
    #[must_use]
    pub const fn new(id: String) -> Self {
        Self(id)
    }

    /// Get the underlying string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CartLineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for CartLineId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for CartLineId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A line item in the cart.
///
/// Embeds full *copies* of the product and flavors as they were at
/// selection time, not live catalog references. That embedding is why the
/// reconciler exists: the catalog can drift underneath a persisted cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Stable line-item identity, assigned at add-time.
    pub cart_id: CartLineId,
    /// Snapshot of the product at selection time.
    pub product: Product,
    /// Selected flavors, at most `product.max_flavors` of them
    /// (enforced by the order builder, not re-validated here).
    #[serde(rename = "gustos")]
    pub flavors: Vec<Flavor>,
    /// Line price. Always equals `product.price` as of the last
    /// reconciliation.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Number of units. Legacy persisted carts may omit it.
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

const fn default_quantity() -> u32 {
    1
}

impl CartItem {
    /// The line subtotal: price times quantity.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}
