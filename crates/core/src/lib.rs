//! Gelateria Core - Shared types library.
//!
//! This crate provides the domain types used across all Gelateria
//! components:
//! - `storefront` - Catalog cache, cart ledger, and reconciliation
//! - `integration-tests` - End-to-end tests over the wired system
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no persistence, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, catalog entities, and cart line items

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
