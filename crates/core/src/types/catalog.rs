//! Catalog entities: product types and flavors.
//!
//! These types mirror the remote catalog API's wire format (Spanish field
//! names) while exposing idiomatic Rust field names internally. Prices are
//! `rust_decimal::Decimal` transported as JSON numbers, so price drift
//! comparisons are exact.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{FlavorId, ProductId};

/// A product type ("tipo de producto"): a sellable container or item.
///
/// Identity is the `id`; `name` is a secondary, human-readable identity
/// used only during cart reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog identifier. May change when the remote catalog is reseeded.
    pub id: ProductId,
    /// Display name, e.g. "1 Kilo" or "Casata".
    #[serde(rename = "nombre")]
    pub name: String,
    /// Unit price.
    #[serde(rename = "precio", with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Maximum number of flavors selectable for this product.
    #[serde(rename = "maxGustos")]
    pub max_flavors: u32,
    /// Whether the product is sold by weight.
    #[serde(rename = "esPorPeso")]
    pub by_weight: bool,
}

/// An ice-cream flavor ("gusto").
///
/// Same dual-identity rule as [`Product`]: `id` is primary, `name` is the
/// reconciliation fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flavor {
    /// Catalog identifier.
    pub id: FlavorId,
    /// Display name, e.g. "Dulce de Leche Granizado".
    #[serde(rename = "nombre")]
    pub name: String,
    /// Optional marketing copy. Empty string when the flavor has none.
    #[serde(rename = "descripcion", default)]
    pub description: String,
    /// Display grouping, e.g. "Chocolates" or "Cremas".
    #[serde(rename = "categoria")]
    pub category: String,
    /// Whether the flavor is currently available.
    #[serde(rename = "hayStock")]
    pub in_stock: bool,
}

/// The combined catalog state published by the cache.
///
/// Replaced wholesale on every successful refresh, never partially mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSnapshot {
    /// Product types, remote entries first after a merge.
    pub products: Vec<Product>,
    /// Flavors, remote entries first after a merge.
    pub flavors: Vec<Flavor>,
    /// When the snapshot was fetched from the remote source.
    /// `None` for the bundled seed.
    pub fetched_at: Option<DateTime<Utc>>,
}

impl CatalogSnapshot {
    /// Look up a product by id.
    #[must_use]
    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Look up a product by normalized name. First match wins when two
    /// entries collide on name.
    #[must_use]
    pub fn product_by_name(&self, name: &str) -> Option<&Product> {
        let wanted = normalized_name(name);
        self.products
            .iter()
            .find(|p| normalized_name(&p.name) == wanted)
    }

    /// Look up a flavor by id.
    #[must_use]
    pub fn flavor(&self, id: FlavorId) -> Option<&Flavor> {
        self.flavors.iter().find(|f| f.id == id)
    }

    /// Look up a flavor by normalized name. First match wins when two
    /// entries collide on name.
    #[must_use]
    pub fn flavor_by_name(&self, name: &str) -> Option<&Flavor> {
        let wanted = normalized_name(name);
        self.flavors
            .iter()
            .find(|f| normalized_name(&f.name) == wanted)
    }
}

/// Normalize a display name for identity comparison: trimmed and
/// case-folded. "  Casata " and "casata" refer to the same entity.
#[must_use]
pub fn normalized_name(name: &str) -> String {
    name.trim().to_lowercase()
}
