//! Gelateria Storefront - offline-first catalog cache with cart
//! reconciliation.
//!
//! The storefront keeps a shopping cart usable and price-accurate across
//! sessions while the authoritative catalog (prices, availability,
//! identifiers) changes underneath it, without ever blocking the UI on a
//! network round trip.
//!
//! # Architecture
//!
//! - [`store`] - Durable key/value layer (file-backed in production)
//! - [`api`] - Remote catalog source: trait seam plus the `reqwest` client
//! - [`catalog`] - Seeded, TTL-revalidated catalog cache with a
//!   remote-wins merge and explicit publish/subscribe
//! - [`cart`] - Ordered cart ledger, persisted on every mutation
//! - [`reconcile`] - Repair pass for cart items whose embedded catalog
//!   snapshots went stale
//! - [`state`] - The [`state::Storefront`] aggregate wiring it all up
//!
//! The cache always has something to serve: it starts from the bundled
//! seed catalog, revalidates against the remote source in the background,
//! and falls back to the last good snapshot when the network is down.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod reconcile;
pub mod state;
pub mod store;
