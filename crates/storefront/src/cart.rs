//! The cart ledger: the authoritative ordered list of line items.
//!
//! Every mutation persists the full cart synchronously, so a process
//! restart (or page reload, in the original deployment of this flow)
//! never loses a cart. A cart that fails to load degrades to empty
//! instead of erroring.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::Utc;
use rand::Rng;
use rand::distr::Alphanumeric;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use gelateria_core::{CartItem, CartLineId, Flavor, Product};

use crate::store::PersistentStore;

/// Storage key for the persisted cart.
pub const CART_KEY: &str = "cart";

const LINE_ID_SUFFIX_LEN: usize = 9;

/// The authoritative ordered cart.
///
/// Share it behind an `Arc`; all mutators take `&self` and persist before
/// returning.
pub struct CartLedger {
    store: Arc<dyn PersistentStore>,
    items: RwLock<Vec<CartItem>>,
}

impl CartLedger {
    /// Load the cart from the store. Absent or malformed data yields an
    /// empty cart, never an error.
    #[must_use]
    pub fn load(store: Arc<dyn PersistentStore>) -> Self {
        let items = store.get(CART_KEY).map_or_else(Vec::new, |raw| {
            serde_json::from_str(&raw).unwrap_or_else(|error| {
                warn!(%error, "persisted cart is malformed, starting empty");
                Vec::new()
            })
        });
        Self {
            store,
            items: RwLock::new(items),
        }
    }

    /// Add a line item for `product` with the given flavors.
    ///
    /// Assigns a fresh [`CartLineId`] and snapshots the product's current
    /// price into the line. Returns the id for later removal.
    pub fn add(&self, product: Product, flavors: Vec<Flavor>, quantity: u32) -> CartLineId {
        let cart_id = new_line_id();
        let item = CartItem {
            cart_id: cart_id.clone(),
            price: product.price,
            product,
            flavors,
            quantity,
        };
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        items.push(item);
        self.persist(&items);
        debug!(cart_id = %cart_id, count = items.len(), "added cart line");
        cart_id
    }

    /// Remove the line item with the given id. A no-op when the id is
    /// absent.
    pub fn remove(&self, cart_id: &CartLineId) {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        items.retain(|item| &item.cart_id != cart_id);
        self.persist(&items);
    }

    /// Empty the cart.
    pub fn clear(&self) {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        items.clear();
        self.persist(&items);
    }

    /// Replace the whole cart, preserving order. Used by the reconciler
    /// to write back repaired items.
    pub fn replace(&self, new_items: Vec<CartItem>) {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        *items = new_items;
        self.persist(&items);
    }

    /// A copy of the current line items, in insertion order.
    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Sum of price times quantity over all line items.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(CartItem::subtotal)
            .sum()
    }

    /// Number of line items (not unit count).
    #[must_use]
    pub fn count(&self) -> usize {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the cart has no line items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    fn persist(&self, items: &[CartItem]) {
        match serde_json::to_string(items) {
            Ok(json) => self.store.set(CART_KEY, &json),
            Err(error) => warn!(%error, "failed to serialize cart"),
        }
    }
}

/// Generate a line id: epoch milliseconds plus a random base36 suffix.
///
/// Unique within one profile, which is all a cart line needs; it is not a
/// global or cryptographic identifier.
fn new_line_id() -> CartLineId {
    let suffix: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(LINE_ID_SUFFIX_LEN)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect();
    CartLineId::new(format!("{}-{suffix}", Utc::now().timestamp_millis()))
}
