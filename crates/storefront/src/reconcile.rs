//! Cart reconciliation against a freshly published catalog.
//!
//! Cart items embed copies of catalog entities, so a cart persisted
//! across sessions can reference prices and ids the catalog no longer
//! agrees with. The reconciler repairs what it can resolve and leaves the
//! rest alone: a cart item never disappears because the catalog moved
//! underneath it, and an untouched cart is not rewritten at all.

use std::sync::Arc;

use tracing::{debug, instrument};

use gelateria_core::{CartItem, CatalogSnapshot, Flavor};

use crate::cart::CartLedger;

/// Subscribes to catalog publications and writes repaired carts back to
/// the ledger.
pub struct Reconciler {
    cart: Arc<CartLedger>,
}

impl Reconciler {
    /// Create a reconciler over the given ledger.
    #[must_use]
    pub const fn new(cart: Arc<CartLedger>) -> Self {
        Self { cart }
    }

    /// Run one full reconciliation pass against `catalog`.
    ///
    /// Runs to completion on the calling task; a partially reconciled
    /// item (price updated, id not) can never be observed. When nothing
    /// drifted, neither the ledger nor its persistence is touched.
    #[instrument(skip_all)]
    pub fn run(&self, catalog: &CatalogSnapshot) {
        let items = self.cart.items();
        if let Some(repaired) = reconcile(&items, catalog) {
            debug!(lines = repaired.len(), "reconciled stale cart items");
            self.cart.replace(repaired);
        }
    }
}

/// Repair every item whose embedded product or flavors drifted from
/// `catalog`.
///
/// Returns `None` when no item changed, so callers can skip persistence
/// and publication entirely; running the pass twice in a row therefore
/// changes the cart at most once.
#[must_use]
pub fn reconcile(items: &[CartItem], catalog: &CatalogSnapshot) -> Option<Vec<CartItem>> {
    let mut any_changed = false;
    let repaired: Vec<CartItem> = items
        .iter()
        .map(|item| {
            reconcile_item(item, catalog).map_or_else(
                || item.clone(),
                |updated| {
                    any_changed = true;
                    updated
                },
            )
        })
        .collect();

    any_changed.then_some(repaired)
}

/// Repair a single item. Returns `None` when the item is already
/// consistent with `catalog`.
fn reconcile_item(item: &CartItem, catalog: &CatalogSnapshot) -> Option<CartItem> {
    let mut changed = false;

    // Product: id lookup first; price drift forces an update. A vanished
    // id falls back to the normalized name, surviving catalog reseeding.
    // Entirely unresolved products are kept as embedded.
    let product = match catalog.product(item.product.id) {
        Some(found) => {
            if found.price == item.price {
                item.product.clone()
            } else {
                changed = true;
                found.clone()
            }
        }
        None => catalog.product_by_name(&item.product.name).map_or_else(
            || item.product.clone(),
            |found| {
                changed = true;
                found.clone()
            },
        ),
    };

    // Flavors: substitute only when resolution lands on a different id.
    let flavors: Vec<Flavor> = item
        .flavors
        .iter()
        .map(|flavor| {
            let resolved = catalog
                .flavor(flavor.id)
                .or_else(|| catalog.flavor_by_name(&flavor.name));
            match resolved {
                Some(found) if found.id != flavor.id => {
                    changed = true;
                    found.clone()
                }
                _ => flavor.clone(),
            }
        })
        .collect();

    changed.then(|| CartItem {
        cart_id: item.cart_id.clone(),
        price: product.price,
        product,
        flavors,
        quantity: item.quantity,
    })
}
