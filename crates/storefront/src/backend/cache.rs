//! Cache types for backend responses.

use std::sync::Arc;

use pixelwear_core::catalog::ProductView;

/// Cache key for catalog data.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Products,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Arc<Vec<ProductView>>),
}
