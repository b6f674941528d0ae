//! Filter specification and the filter/sort pipeline.

use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ProductView;

/// Category value meaning "no category filter".
pub const ALL_CATEGORIES: &str = "all";

/// Default upper price bound, matching the storefront price slider.
const DEFAULT_MAX_PRICE: i64 = 10_000;

/// Ordering applied after filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Keep the upstream order (newest first from the backend).
    #[default]
    Featured,
    PriceAsc,
    PriceDesc,
    /// Case-sensitive lexicographic order of the product name.
    Name,
}

impl SortKey {
    /// The wire name of the sort key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Featured => "featured",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::Name => "name",
        }
    }
}

impl core::fmt::Display for SortKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "featured" => Ok(Self::Featured),
            "price-asc" | "price_asc" => Ok(Self::PriceAsc),
            "price-desc" | "price_desc" => Ok(Self::PriceDesc),
            "name" => Ok(Self::Name),
            _ => Err(format!("invalid sort key: {s}")),
        }
    }
}

/// The shopper's current catalog-narrowing intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Exact category to keep. `None`, empty, or `"all"` keeps every category.
    pub category: Option<String>,
    /// Case-insensitive substring matched against name, description, and category.
    pub search: String,
    /// Inclusive lower price bound.
    pub min_price: Decimal,
    /// Inclusive upper price bound.
    pub max_price: Decimal,
    pub sort: SortKey,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            category: None,
            search: String::new(),
            min_price: Decimal::ZERO,
            max_price: Decimal::from(DEFAULT_MAX_PRICE),
            sort: SortKey::Featured,
        }
    }
}

impl FilterSpec {
    /// The category to match, or `None` for a blank value or the "all"
    /// sentinel. Anything else is compared verbatim.
    #[must_use]
    pub fn category_filter(&self) -> Option<&str> {
        self.category
            .as_deref()
            .filter(|c| !c.trim().is_empty() && !c.eq_ignore_ascii_case(ALL_CATEGORIES))
    }

    fn matches_category(&self, product: &ProductView) -> bool {
        self.category_filter()
            .is_none_or(|category| product.category == category)
    }

    fn matches_price(&self, product: &ProductView) -> bool {
        self.min_price <= product.price && product.price <= self.max_price
    }
}

/// `needle` must already be lowercased. A blank needle matches everything.
fn matches_search(needle: &str, product: &ProductView) -> bool {
    needle.trim().is_empty()
        || product.name.to_lowercase().contains(needle)
        || product.description.to_lowercase().contains(needle)
        || product.category.to_lowercase().contains(needle)
}

/// Derive the visible subset of `products` for `spec`.
///
/// Applies the category, search and price predicates in that order, then a
/// stable sort. The input is not modified. Identical inputs always produce
/// identical output, including order.
#[must_use]
pub fn view(products: &[ProductView], spec: &FilterSpec) -> Vec<ProductView> {
    let needle = spec.search.to_lowercase();

    let mut visible: Vec<ProductView> = products
        .iter()
        .filter(|p| spec.matches_category(p))
        .filter(|p| matches_search(&needle, p))
        .filter(|p| spec.matches_price(p))
        .cloned()
        .collect();

    match spec.sort {
        SortKey::Featured => {}
        SortKey::PriceAsc => visible.sort_by(|a, b| a.price.cmp(&b.price)),
        SortKey::PriceDesc => visible.sort_by(|a, b| b.price.cmp(&a.price)),
        SortKey::Name => visible.sort_by(|a, b| a.name.cmp(&b.name)),
    }

    visible
}
