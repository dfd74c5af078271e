//! Bundled static catalog.
//!
//! The seed is the zero-latency initial state: the UI renders it before
//! any network access completes, and it remains the fallback source when
//! the remote catalog never answers. Prices here go stale between
//! releases; the merge in [`super::merge`] lets the remote catalog
//! override every entry it knows about.

use rust_decimal::Decimal;

use gelateria_core::{Flavor, FlavorId, Product, ProductId};

fn product(id: i64, name: &str, price: i64, max_flavors: u32, by_weight: bool) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        price: Decimal::from(price),
        max_flavors,
        by_weight,
    }
}

fn flavor(id: i64, name: &str, description: &str, category: &str) -> Flavor {
    Flavor {
        id: FlavorId::new(id),
        name: name.to_string(),
        description: description.to_string(),
        category: category.to_string(),
        in_stock: true,
    }
}

/// The bundled product types.
#[must_use]
pub fn seed_products() -> Vec<Product> {
    vec![
        product(1, "1 Kilo", 18000, 4, true),
        product(2, "1/2 Kilo", 10000, 3, true),
        product(3, "1/4 Kilo", 6000, 2, true),
        product(4, "Casata", 3500, 0, false),
        product(5, "Almendrado", 3000, 0, false),
        product(6, "Bombon Suizo", 3000, 0, false),
    ]
}

/// The bundled flavors, grouped by category.
#[must_use]
pub fn seed_flavors() -> Vec<Flavor> {
    vec![
        // Chocolates
        flavor(101, "Chocolate", "", "Chocolates"),
        flavor(
            102,
            "Chocolate con Almendras",
            "Clásico chocolate con almendras tostadas.",
            "Chocolates",
        ),
        flavor(103, "Chocolate Blanco", "Cremoso chocolate blanco.", "Chocolates"),
        flavor(
            104,
            "Chocolate Especial",
            "Con dulce de leche natural y trozos de chocolate blanco",
            "Chocolates",
        ),
        flavor(
            105,
            "Chocolate Dubai",
            "Clásico chocolate con variegato de pistacho crunchy",
            "Chocolates",
        ),
        // Dulces de Leche
        flavor(
            201,
            "Dulce de Leche Granizado",
            "Con trozos de chocolate amargo.",
            "Dulces",
        ),
        flavor(202, "Dulce de Leche", "", "Dulces"),
        // Cremas
        flavor(301, "Sambayón", "", "Cremas"),
        flavor(
            302,
            "Tramontana",
            "Crema americana con dulce de leche y bolitas de chocolate.",
            "Cremas",
        ),
        flavor(303, "Vainilla", "", "Cremas"),
        flavor(304, "Granizado", "Americana con trozos de chocolate.", "Cremas"),
        flavor(305, "Crema Oreo", "Crema americana con galletitas Oreo.", "Cremas"),
        flavor(306, "Frutilla", "", "Cremas"),
        flavor(307, "Menta Granizada", "", "Cremas"),
        flavor(308, "Banana Split", "", "Cremas"),
        flavor(309, "Crema Americana", "", "Cremas"),
        flavor(310, "Mascarpone con Frutos Rojos", "", "Cremas"),
        flavor(311, "Flan al Caramelo", "", "Cremas"),
        flavor(312, "Crema de Almendras", "", "Cremas"),
        flavor(313, "Pistacho", "", "Cremas"),
        flavor(314, "Ferrero Rocher", "", "Cremas"),
        flavor(315, "Mantecol", "", "Cremas"),
        // Frutales
        flavor(401, "Limón", "Jugo natural de limón.", "Frutales"),
        flavor(402, "Frambuesa con Maracuya", "", "Frutales"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use gelateria_core::normalized_name;
    use std::collections::HashSet;

    #[test]
    fn test_seed_is_nonempty() {
        assert_eq!(seed_products().len(), 6);
        assert_eq!(seed_flavors().len(), 24);
    }

    #[test]
    fn test_seed_ids_and_names_are_unique() {
        let products = seed_products();
        let ids: HashSet<_> = products.iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), products.len());
        let names: HashSet<_> = products
            .iter()
            .map(|p| normalized_name(&p.name))
            .collect();
        assert_eq!(names.len(), products.len());

        let flavors = seed_flavors();
        let ids: HashSet<_> = flavors.iter().map(|f| f.id).collect();
        assert_eq!(ids.len(), flavors.len());
        let names: HashSet<_> = flavors
            .iter()
            .map(|f| normalized_name(&f.name))
            .collect();
        assert_eq!(names.len(), flavors.len());
    }

    #[test]
    fn test_seed_flavors_are_in_stock() {
        assert!(seed_flavors().iter().all(|f| f.in_stock));
    }
}
