//! Catalog products and the filter pipeline.
//!
//! [`ProductView`] is the only product shape the pipeline understands.
//! Records from the hosted backend are mapped into it at the boundary, so
//! optional or renamed backend fields never reach filtering or sorting.

mod filter;

pub use filter::{ALL_CATEGORIES, FilterSpec, SortKey, view};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::ProductId;

/// Read-only projection of a catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
    /// Main image URL.
    pub image: String,
    /// Secondary image URLs in admin-defined order.
    pub images: Vec<String>,
    pub colors: Vec<String>,
    pub sizes: Vec<String>,
    pub featured: bool,
    pub is_new: bool,
}

impl ProductView {
    /// Create a product with the fields the pipeline filters on.
    #[must_use]
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        price: Decimal,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            price,
            category: category.into(),
            image: String::new(),
            images: Vec::new(),
            colors: Vec::new(),
            sizes: Vec::new(),
            featured: false,
            is_new: false,
        }
    }
}

/// Distinct categories in first-seen order.
#[must_use]
pub fn categories(products: &[ProductView]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for product in products {
        if !product.category.is_empty() && !seen.contains(&product.category) {
            seen.push(product.category.clone());
        }
    }
    seen
}

/// Up to `limit` featured products, in upstream order.
#[must_use]
pub fn featured(products: &[ProductView], limit: usize) -> Vec<ProductView> {
    products
        .iter()
        .filter(|p| p.featured)
        .take(limit)
        .cloned()
        .collect()
}

/// Up to `limit` products flagged as new, in upstream order.
#[must_use]
pub fn new_arrivals(products: &[ProductView], limit: usize) -> Vec<ProductView> {
    products
        .iter()
        .filter(|p| p.is_new)
        .take(limit)
        .cloned()
        .collect()
}

/// Find a product by ID.
#[must_use]
pub fn find<'a>(products: &'a [ProductView], id: &ProductId) -> Option<&'a ProductView> {
    products.iter().find(|p| &p.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<ProductView> {
        let mut hoodie =
            ProductView::new(1, "PlayStation Logo Hoodie", Decimal::new(5999, 2), "playstation");
        hoodie.featured = true;
        let mut tee = ProductView::new(2, "Xbox Controller T-Shirt", Decimal::new(2999, 2), "xbox");
        tee.featured = true;
        tee.is_new = true;
        let mut cap =
            ProductView::new(3, "Gaming Snapback Cap", Decimal::new(2499, 2), "accessories");
        cap.is_new = true;
        let socks = ProductView::new(4, "Gaming Socks", Decimal::new(1499, 2), "accessories");
        vec![hoodie, tee, cap, socks]
    }

    #[test]
    fn test_categories_first_seen_order() {
        assert_eq!(
            categories(&catalog()),
            ["playstation", "xbox", "accessories"]
        );
    }

    #[test]
    fn test_featured_respects_limit() {
        let products = catalog();
        let all = featured(&products, 10);
        assert_eq!(all.len(), 2);
        let one = featured(&products, 1);
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].id, ProductId::Numeric(1));
    }

    #[test]
    fn test_new_arrivals() {
        let ids: Vec<_> = new_arrivals(&catalog(), 5).into_iter().map(|p| p.id).collect();
        assert_eq!(ids, [ProductId::Numeric(2), ProductId::Numeric(3)]);
    }

    #[test]
    fn test_find() {
        let products = catalog();
        assert_eq!(
            find(&products, &ProductId::Numeric(3)).map(|p| p.name.as_str()),
            Some("Gaming Snapback Cap")
        );
        assert!(find(&products, &ProductId::Text("3".to_string())).is_none());
    }
}
