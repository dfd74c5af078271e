//! Integration tests for Gelateria.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p gelateria-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `catalog_refresh` - Refresh, TTL adoption, and merge over the wired
//!   storefront
//! - `cart_reconciliation` - Catalog publications repairing the cart
//! - `offline_resilience` - Seed fallback and cart survival with the
//!   remote source down
//!
//! This crate's library half provides shared fixtures: deterministic
//! [`CatalogSource`] implementations and catalog entity builders. No
//! network is involved anywhere; the remote source is always a fixture.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::future::{Future, ready};
use std::sync::atomic::{AtomicUsize, Ordering};

use gelateria_core::{Flavor, FlavorId, Product, ProductId};
use gelateria_storefront::api::{ApiError, CatalogSource};
use rust_decimal::Decimal;

/// Initialize test logging. Safe to call from every test; only the first
/// call wins.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gelateria_storefront=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

/// Build a product fixture.
#[must_use]
pub fn product(id: i64, name: &str, price: i64) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        price: Decimal::from(price),
        max_flavors: 3,
        by_weight: false,
    }
}

/// Build an in-stock flavor fixture.
#[must_use]
pub fn flavor(id: i64, name: &str) -> Flavor {
    Flavor {
        id: FlavorId::new(id),
        name: name.to_string(),
        description: String::new(),
        category: "Cremas".to_string(),
        in_stock: true,
    }
}

/// Catalog source serving fixed data, counting product fetches.
pub struct StaticSource {
    products: Vec<Product>,
    flavors: Vec<Flavor>,
    calls: AtomicUsize,
}

impl StaticSource {
    /// Serve exactly these products and flavors on every fetch.
    #[must_use]
    pub const fn new(products: Vec<Product>, flavors: Vec<Flavor>) -> Self {
        Self {
            products,
            flavors,
            calls: AtomicUsize::new(0),
        }
    }

    /// How many times the product endpoint was fetched.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CatalogSource for StaticSource {
    fn product_types(&self) -> impl Future<Output = Result<Vec<Product>, ApiError>> + Send {
        self.calls.fetch_add(1, Ordering::SeqCst);
        ready(Ok(self.products.clone()))
    }

    fn active_flavors(&self) -> impl Future<Output = Result<Vec<Flavor>, ApiError>> + Send {
        ready(Ok(self.flavors.clone()))
    }
}

/// Catalog source whose backend is unreachable.
pub struct DownSource;

impl CatalogSource for DownSource {
    fn product_types(&self) -> impl Future<Output = Result<Vec<Product>, ApiError>> + Send {
        ready(Err(ApiError::Status {
            status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            body: "unreachable".to_string(),
        }))
    }

    fn active_flavors(&self) -> impl Future<Output = Result<Vec<Flavor>, ApiError>> + Send {
        ready(Err(ApiError::Status {
            status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            body: "unreachable".to_string(),
        }))
    }
}
