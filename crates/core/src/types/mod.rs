//! Domain types shared across Gelateria crates.

mod cart;
mod catalog;
mod id;

pub use cart::{CartItem, CartLineId};
pub use catalog::{CatalogSnapshot, Flavor, Product, normalized_name};
pub use id::{FlavorId, ProductId};
