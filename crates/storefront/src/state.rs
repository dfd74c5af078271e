//! Storefront state shared across the application.
//!
//! Ties the persistent store, catalog cache, cart ledger and reconciler
//! together with an explicit lifecycle, independent of any UI framework:
//! construct it once, inject it wherever catalog or cart access is
//! needed, and call [`Storefront::refresh_catalog`] whenever freshness
//! matters (startup, manual reload, a future TTL timer).

use std::sync::Arc;

use crate::api::{CatalogSource, RemoteCatalogClient};
use crate::cart::CartLedger;
use crate::catalog::CatalogCache;
use crate::config::StorefrontConfig;
use crate::reconcile::Reconciler;
use crate::store::{FileStore, PersistentStore};

/// Application state shared across all consumers.
///
/// Cheaply cloneable via `Arc`. The reconciler is subscribed to catalog
/// publications at construction time, so every completed refresh repairs
/// the cart before anything else observes the new snapshot.
pub struct Storefront<S: CatalogSource = RemoteCatalogClient> {
    inner: Arc<StorefrontInner<S>>,
}

struct StorefrontInner<S: CatalogSource> {
    config: StorefrontConfig,
    catalog: Arc<CatalogCache<S>>,
    cart: Arc<CartLedger>,
}

impl<S: CatalogSource> Clone for Storefront<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Storefront {
    /// Build the production storefront: file-backed persistence under the
    /// configured data directory and the HTTP catalog client.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let source = RemoteCatalogClient::new(&config);
        let store = Arc::new(FileStore::new(config.data_dir.clone()));
        Self::with_parts(config, source, store)
    }
}

impl<S: CatalogSource + Send + Sync + 'static> Storefront<S> {
    /// Build a storefront over explicit collaborators.
    ///
    /// The cart loads from the store immediately; the catalog starts on
    /// the bundled seed and the reconciler is wired to its publications.
    pub fn with_parts(
        config: StorefrontConfig,
        source: S,
        store: Arc<dyn PersistentStore>,
    ) -> Self {
        let cart = Arc::new(CartLedger::load(Arc::clone(&store)));
        let catalog = Arc::new(CatalogCache::new(source, store, config.catalog_ttl));

        let reconciler = Arc::new(Reconciler::new(Arc::clone(&cart)));
        catalog.subscribe(move |snapshot| reconciler.run(snapshot));

        Self {
            inner: Arc::new(StorefrontInner {
                config,
                catalog,
                cart,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the catalog cache.
    #[must_use]
    pub fn catalog(&self) -> &CatalogCache<S> {
        &self.inner.catalog
    }

    /// Get a reference to the cart ledger.
    #[must_use]
    pub fn cart(&self) -> &CartLedger {
        &self.inner.cart
    }

    /// Revalidate the catalog; see [`CatalogCache::refresh`].
    pub async fn refresh_catalog(&self, force: bool) {
        self.inner.catalog.refresh(force).await;
    }

    /// End the catalog's publish/subscribe lifecycle.
    pub fn dispose(&self) {
        self.inner.catalog.dispose();
    }
}
