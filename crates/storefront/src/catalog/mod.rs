//! Seeded, TTL-revalidated catalog cache.
//!
//! The cache always answers from memory: it is constructed over the
//! bundled seed, so the consumer never observes an empty catalog, and
//! every refresh either improves on the current snapshot or leaves it
//! alone. Freshness is time-boxed: a persisted snapshot younger than the
//! TTL is adopted without touching the network.
//!
//! Lifecycle per instance: `SEEDED -> REVALIDATING -> FRESH`, with
//! `FRESH -> REVALIDATING` repeating on every triggered refresh. A failed
//! revalidation falls back to the last good snapshot; there is no
//! user-visible failure state.

pub mod merge;
pub mod seed;

use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, instrument, warn};

use gelateria_core::{CatalogSnapshot, Flavor, Product};

use crate::api::CatalogSource;
use crate::store::PersistentStore;

use merge::merge;
use seed::{seed_flavors, seed_products};

/// Storage key for the persisted product list.
pub const PRODUCTS_KEY: &str = "catalog_products";
/// Storage key for the persisted flavor list.
pub const FLAVORS_KEY: &str = "catalog_flavors";
/// Storage key for the snapshot timestamp (epoch milliseconds).
pub const FETCHED_AT_KEY: &str = "catalog_fetched_at";

/// Where the current snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// Serving the bundled seed; no revalidation attempted yet.
    Seeded,
    /// A refresh is in flight; the previous snapshot keeps serving.
    Revalidating,
    /// Serving the last good snapshot (persisted or freshly merged).
    Fresh,
}

type SubscriberFn = dyn Fn(&CatalogSnapshot) + Send + Sync;

struct Current {
    snapshot: CatalogSnapshot,
    state: CacheState,
}

/// In-memory catalog authority with durable backing.
///
/// Generic over the remote [`CatalogSource`] so tests can drive it with
/// fixtures. Share it behind an `Arc`; all methods take `&self`.
pub struct CatalogCache<S> {
    source: S,
    store: Arc<dyn PersistentStore>,
    ttl: Duration,
    current: RwLock<Current>,
    subscribers: Mutex<Vec<Arc<SubscriberFn>>>,
    // Serializes overlapping refreshes: the loser of the race re-checks
    // the persisted snapshot and adopts the winner's result.
    refresh_guard: tokio::sync::Mutex<()>,
}

impl<S: CatalogSource> CatalogCache<S> {
    /// Create a cache serving the bundled seed.
    ///
    /// Synchronous and side-effect free beyond the assignment; the first
    /// network access happens in [`refresh`](Self::refresh).
    #[must_use]
    pub fn new(source: S, store: Arc<dyn PersistentStore>, ttl: Duration) -> Self {
        Self {
            source,
            store,
            ttl,
            current: RwLock::new(Current {
                snapshot: CatalogSnapshot {
                    products: seed_products(),
                    flavors: seed_flavors(),
                    fetched_at: None,
                },
                state: CacheState::Seeded,
            }),
            subscribers: Mutex::new(Vec::new()),
            refresh_guard: tokio::sync::Mutex::new(()),
        }
    }

    /// The current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> CatalogSnapshot {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot
            .clone()
    }

    /// The current product list.
    #[must_use]
    pub fn products(&self) -> Vec<Product> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot
            .products
            .clone()
    }

    /// The current flavor list.
    #[must_use]
    pub fn flavors(&self) -> Vec<Flavor> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot
            .flavors
            .clone()
    }

    /// Where the current snapshot came from.
    #[must_use]
    pub fn state(&self) -> CacheState {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .state
    }

    /// Register a subscriber invoked after every snapshot publication.
    ///
    /// Subscribers run in registration order, on the publishing task,
    /// after the snapshot assignment has fully completed.
    pub fn subscribe(&self, subscriber: impl Fn(&CatalogSnapshot) + Send + Sync + 'static) {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(subscriber));
    }

    /// Detach all subscribers. Later publications still update the
    /// in-memory snapshot but notify nobody.
    pub fn dispose(&self) {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Revalidate the catalog against the remote source.
    ///
    /// Without `force`, a persisted snapshot younger than the TTL is
    /// adopted and no request is made. Otherwise products and flavors are
    /// fetched concurrently, merged remote-wins over the current snapshot,
    /// persisted, and published. Fetch and parse failures are swallowed:
    /// the last good snapshot (or the seed) stays authoritative.
    #[instrument(skip(self))]
    pub async fn refresh(&self, force: bool) {
        let _in_flight = self.refresh_guard.lock().await;
        self.set_state(CacheState::Revalidating);

        if !force
            && let Some(snapshot) = self.load_fresh_persisted()
        {
            debug!("adopting persisted catalog snapshot");
            self.publish(snapshot);
            return;
        }

        debug!("fetching catalog from remote source");
        match tokio::try_join!(self.source.product_types(), self.source.active_flavors()) {
            Ok((products, flavors)) => {
                let current = self.snapshot();
                let snapshot = CatalogSnapshot {
                    products: merge(current.products, products),
                    flavors: merge(current.flavors, flavors),
                    fetched_at: Some(Utc::now()),
                };
                self.persist(&snapshot);
                self.publish(snapshot);
            }
            Err(error) => {
                warn!(%error, "catalog refresh failed, keeping last good snapshot");
                self.set_state(CacheState::Fresh);
            }
        }
    }

    /// Load the persisted snapshot if it exists and is younger than the
    /// TTL. Malformed values are treated as absent.
    fn load_fresh_persisted(&self) -> Option<CatalogSnapshot> {
        let fetched_at_raw = self.store.get(FETCHED_AT_KEY)?;
        let products_raw = self.store.get(PRODUCTS_KEY)?;
        let flavors_raw = self.store.get(FLAVORS_KEY)?;

        let millis: i64 = fetched_at_raw.trim().parse().ok()?;
        let fetched_at = DateTime::from_timestamp_millis(millis)?;
        let ttl = chrono::Duration::from_std(self.ttl).ok()?;
        if Utc::now().signed_duration_since(fetched_at) >= ttl {
            debug!("persisted catalog snapshot expired");
            return None;
        }

        let products: Vec<Product> = parse_persisted(PRODUCTS_KEY, &products_raw)?;
        let flavors: Vec<Flavor> = parse_persisted(FLAVORS_KEY, &flavors_raw)?;

        Some(CatalogSnapshot {
            products,
            flavors,
            fetched_at: Some(fetched_at),
        })
    }

    fn persist(&self, snapshot: &CatalogSnapshot) {
        match serde_json::to_string(&snapshot.products) {
            Ok(json) => self.store.set(PRODUCTS_KEY, &json),
            Err(error) => warn!(%error, "failed to serialize products"),
        }
        match serde_json::to_string(&snapshot.flavors) {
            Ok(json) => self.store.set(FLAVORS_KEY, &json),
            Err(error) => warn!(%error, "failed to serialize flavors"),
        }
        if let Some(fetched_at) = snapshot.fetched_at {
            self.store
                .set(FETCHED_AT_KEY, &fetched_at.timestamp_millis().to_string());
        }
    }

    /// Publish a snapshot: assign it, then notify subscribers.
    ///
    /// The assignment fully completes before any subscriber runs, and no
    /// internal lock is held while subscribers execute.
    fn publish(&self, snapshot: CatalogSnapshot) {
        {
            let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
            current.snapshot = snapshot.clone();
            current.state = CacheState::Fresh;
        }

        let subscribers: Vec<Arc<SubscriberFn>> = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for subscriber in &subscribers {
            subscriber(&snapshot);
        }
    }

    fn set_state(&self, state: CacheState) {
        self.current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .state = state;
    }
}

fn parse_persisted<T: serde::de::DeserializeOwned>(key: &str, raw: &str) -> Option<T> {
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(error) => {
            warn!(key, %error, "persisted catalog value is malformed, ignoring");
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::store::MemoryStore;
    use gelateria_core::{FlavorId, ProductId};
    use rust_decimal::Decimal;
    use std::future::{Future, ready};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn product(id: i64, name: &str, price: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            price: Decimal::from(price),
            max_flavors: 2,
            by_weight: false,
        }
    }

    fn flavor(id: i64, name: &str) -> Flavor {
        Flavor {
            id: FlavorId::new(id),
            name: name.to_string(),
            description: String::new(),
            category: "Cremas".to_string(),
            in_stock: true,
        }
    }

    /// Source that serves fixed data and counts requests.
    struct StaticSource {
        products: Vec<Product>,
        flavors: Vec<Flavor>,
        calls: AtomicUsize,
    }

    impl StaticSource {
        fn new(products: Vec<Product>, flavors: Vec<Flavor>) -> Self {
            Self {
                products,
                flavors,
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
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

    /// Source with an unreachable backend.
    struct DownSource;

    impl CatalogSource for DownSource {
        fn product_types(&self) -> impl Future<Output = Result<Vec<Product>, ApiError>> + Send {
            ready(Err(ApiError::Status {
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                body: "down".to_string(),
            }))
        }

        fn active_flavors(&self) -> impl Future<Output = Result<Vec<Flavor>, ApiError>> + Send {
            ready(Err(ApiError::Status {
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                body: "down".to_string(),
            }))
        }
    }

    fn cache_over<S: CatalogSource>(
        source: S,
        store: &Arc<MemoryStore>,
        ttl: Duration,
    ) -> CatalogCache<S> {
        CatalogCache::new(source, Arc::clone(store) as Arc<dyn PersistentStore>, ttl)
    }

    fn persist_snapshot(store: &MemoryStore, products: &[Product], flavors: &[Flavor], age: chrono::Duration) {
        store.set(PRODUCTS_KEY, &serde_json::to_string(products).unwrap());
        store.set(FLAVORS_KEY, &serde_json::to_string(flavors).unwrap());
        let fetched_at = Utc::now() - age;
        store.set(FETCHED_AT_KEY, &fetched_at.timestamp_millis().to_string());
    }

    #[test]
    fn test_new_cache_serves_seed() {
        let store = Arc::new(MemoryStore::new());
        let cache = cache_over(DownSource, &store, Duration::from_secs(3600));

        assert_eq!(cache.state(), CacheState::Seeded);
        assert!(!cache.products().is_empty());
        assert!(!cache.flavors().is_empty());
        assert_eq!(cache.snapshot().fetched_at, None);
    }

    #[tokio::test]
    async fn test_refresh_merges_persists_and_publishes() {
        let store = Arc::new(MemoryStore::new());
        let source = StaticSource::new(
            vec![product(104, "casata", 3900)],
            vec![flavor(501, "Pistacho Premium")],
        );
        let cache = cache_over(source, &store, Duration::from_secs(3600));

        let published = Arc::new(AtomicUsize::new(0));
        {
            let published = Arc::clone(&published);
            cache.subscribe(move |_| {
                published.fetch_add(1, Ordering::SeqCst);
            });
        }

        cache.refresh(false).await;

        assert_eq!(cache.state(), CacheState::Fresh);
        assert_eq!(published.load(Ordering::SeqCst), 1);

        // Remote entry first and authoritative; seed's Casata (id 4) gone.
        let products = cache.products();
        assert_eq!(products.first().unwrap().id, ProductId::new(104));
        assert!(products.iter().all(|p| p.id != ProductId::new(4)));
        // Seed entries the remote does not know keep filling the gaps.
        assert!(products.iter().any(|p| p.name == "1 Kilo"));

        // Snapshot persisted as a unit: both lists plus the timestamp.
        assert!(store.get(PRODUCTS_KEY).is_some());
        assert!(store.get(FLAVORS_KEY).is_some());
        assert!(store.get(FETCHED_AT_KEY).is_some());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_current_snapshot() {
        let store = Arc::new(MemoryStore::new());
        let cache = cache_over(DownSource, &store, Duration::from_secs(3600));
        let before = cache.snapshot();

        cache.refresh(false).await;

        assert_eq!(cache.snapshot(), before);
        assert_eq!(cache.state(), CacheState::Fresh);
        assert_eq!(store.get(PRODUCTS_KEY), None);
    }

    #[tokio::test]
    async fn test_fresh_persisted_snapshot_is_adopted_without_network() {
        let store = Arc::new(MemoryStore::new());
        let persisted = vec![product(104, "casata", 3900)];
        persist_snapshot(&store, &persisted, &[flavor(501, "Pistacho Premium")], chrono::Duration::zero());

        let source = StaticSource::new(Vec::new(), Vec::new());
        let cache = cache_over(source, &store, Duration::from_secs(3600));

        cache.refresh(false).await;

        assert_eq!(cache.source.call_count(), 0);
        assert_eq!(cache.state(), CacheState::Fresh);
        assert_eq!(cache.products(), persisted);
    }

    #[tokio::test]
    async fn test_expired_persisted_snapshot_goes_to_network() {
        let store = Arc::new(MemoryStore::new());
        persist_snapshot(
            &store,
            &[product(104, "casata", 3900)],
            &[],
            chrono::Duration::hours(2),
        );

        let source = StaticSource::new(vec![product(104, "casata", 4100)], Vec::new());
        let cache = cache_over(source, &store, Duration::from_secs(3600));

        cache.refresh(false).await;

        assert_eq!(cache.source.call_count(), 1);
        let updated = cache.products();
        assert_eq!(updated.first().unwrap().price, Decimal::from(4100));
    }

    #[tokio::test]
    async fn test_force_bypasses_fresh_persisted_snapshot() {
        let store = Arc::new(MemoryStore::new());
        persist_snapshot(
            &store,
            &[product(104, "casata", 3900)],
            &[],
            chrono::Duration::zero(),
        );

        let source = StaticSource::new(vec![product(104, "casata", 4100)], Vec::new());
        let cache = cache_over(source, &store, Duration::from_secs(3600));

        cache.refresh(true).await;

        assert_eq!(cache.source.call_count(), 1);
        assert_eq!(cache.products().first().unwrap().price, Decimal::from(4100));
    }

    #[tokio::test]
    async fn test_malformed_persisted_snapshot_falls_through_to_network() {
        let store = Arc::new(MemoryStore::new());
        store.set(PRODUCTS_KEY, "not json");
        store.set(FLAVORS_KEY, "[]");
        store.set(
            FETCHED_AT_KEY,
            &Utc::now().timestamp_millis().to_string(),
        );

        let source = StaticSource::new(vec![product(104, "casata", 3900)], Vec::new());
        let cache = cache_over(source, &store, Duration::from_secs(3600));

        cache.refresh(false).await;

        assert_eq!(cache.source.call_count(), 1);
        // The malformed value was replaced by the fresh fetch.
        let raw = store.get(PRODUCTS_KEY).unwrap();
        assert!(serde_json::from_str::<Vec<Product>>(&raw).is_ok());
    }

    #[tokio::test]
    async fn test_dispose_detaches_subscribers() {
        let store = Arc::new(MemoryStore::new());
        let source = StaticSource::new(vec![product(104, "casata", 3900)], Vec::new());
        let cache = cache_over(source, &store, Duration::from_secs(3600));

        let published = Arc::new(AtomicUsize::new(0));
        {
            let published = Arc::clone(&published);
            cache.subscribe(move |_| {
                published.fetch_add(1, Ordering::SeqCst);
            });
        }
        cache.dispose();

        cache.refresh(true).await;

        assert_eq!(published.load(Ordering::SeqCst), 0);
        // The snapshot itself still advanced.
        assert_eq!(cache.state(), CacheState::Fresh);
    }
}
