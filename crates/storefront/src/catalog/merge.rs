//! Remote-wins merge between the bundled defaults and a remote fetch.
//!
//! The remote source is authoritative for everything it defines (price,
//! stock, id); defaults only plug the gaps. Matching is by normalized
//! name, so a reseeded remote catalog that renumbered its ids still
//! supersedes the seed entry with the same name. Defaults whose id the
//! remote reuses are dropped too, keeping ids unique in the result.

use std::collections::HashSet;

use gelateria_core::{Flavor, Product, normalized_name};

/// Identity view over catalog entries, used by [`merge`].
pub trait CatalogEntity {
    /// The raw numeric id.
    fn raw_id(&self) -> i64;
    /// The display name (normalized for comparison by the merge).
    fn display_name(&self) -> &str;
}

impl CatalogEntity for Product {
    fn raw_id(&self) -> i64 {
        self.id.as_i64()
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

impl CatalogEntity for Flavor {
    fn raw_id(&self) -> i64 {
        self.id.as_i64()
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

/// Merge `remote` over `defaults`.
///
/// Remote entries come first and win every conflict; defaults survive only
/// when neither their normalized name nor their id appears in `remote`.
/// An empty `remote` leaves `defaults` untouched. Deterministic for a
/// given pair of inputs.
#[must_use]
pub fn merge<T: CatalogEntity>(defaults: Vec<T>, remote: Vec<T>) -> Vec<T> {
    if remote.is_empty() {
        return defaults;
    }

    let remote_names: HashSet<String> = remote
        .iter()
        .map(|e| normalized_name(e.display_name()))
        .collect();
    let remote_ids: HashSet<i64> = remote.iter().map(CatalogEntity::raw_id).collect();

    let mut merged = remote;
    merged.extend(defaults.into_iter().filter(|d| {
        !remote_names.contains(&normalized_name(d.display_name()))
            && !remote_ids.contains(&d.raw_id())
    }));
    merged
}
