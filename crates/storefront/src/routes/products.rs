//! Product route handlers.

use std::str::FromStr;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use pixelwear_core::ProductId;
use pixelwear_core::catalog::{self, FilterSpec, ProductView, SortKey};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Default number of products in a rail.
const DEFAULT_RAIL_LIMIT: usize = 8;

/// Upper bound on the rail `limit` parameter.
const MAX_RAIL_LIMIT: usize = 50;

/// Catalog listing query parameters.
///
/// Every parameter is optional; omitted ones fall back to
/// [`FilterSpec::default`].
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub q: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub sort: Option<String>,
}

impl ProductQuery {
    /// Build the filter spec for this query.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::BadRequest`] for an unparsable price bound or an
    /// unknown sort key.
    pub fn into_filter(self) -> Result<FilterSpec> {
        let mut spec = FilterSpec {
            category: self.category,
            search: self.q.unwrap_or_default(),
            ..FilterSpec::default()
        };

        if let Some(min) = non_blank(self.min_price.as_deref()) {
            spec.min_price = parse_price("min_price", min)?;
        }
        if let Some(max) = non_blank(self.max_price.as_deref()) {
            spec.max_price = parse_price("max_price", max)?;
        }
        if let Some(sort) = non_blank(self.sort.as_deref()) {
            spec.sort = SortKey::from_str(sort).map_err(AppError::BadRequest)?;
        }

        Ok(spec)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_price(field: &str, value: &str) -> Result<Decimal> {
    Decimal::from_str(value).map_err(|_| AppError::BadRequest(format!("invalid {field}: {value}")))
}

/// Query parameters for the short product rails (featured, new arrivals).
#[derive(Debug, Deserialize)]
pub struct RailQuery {
    pub limit: Option<usize>,
}

impl RailQuery {
    fn limit(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_RAIL_LIMIT)
            .min(MAX_RAIL_LIMIT)
    }
}

/// List the catalog through the filter pipeline.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<ProductView>>> {
    let spec = query.into_filter()?;
    let products = state.backend().list_products().await?;

    let visible = catalog::view(&products, &spec);
    tracing::debug!(total = products.len(), visible = visible.len(), "Catalog filtered");

    Ok(Json(visible))
}

/// List featured products in upstream order.
#[instrument(skip(state))]
pub async fn featured(
    State(state): State<AppState>,
    Query(query): Query<RailQuery>,
) -> Result<Json<Vec<ProductView>>> {
    let products = state.backend().list_products().await?;
    Ok(Json(catalog::featured(&products, query.limit())))
}

/// List products flagged as new, newest first.
#[instrument(skip(state))]
pub async fn new_arrivals(
    State(state): State<AppState>,
    Query(query): Query<RailQuery>,
) -> Result<Json<Vec<ProductView>>> {
    let products = state.backend().list_products().await?;
    Ok(Json(catalog::new_arrivals(&products, query.limit())))
}

/// Show a single product.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductView>> {
    let id = match ProductId::from_str(id.trim()) {
        Ok(id) if !id.is_empty() => id,
        _ => return Err(AppError::BadRequest("product id is required".to_string())),
    };

    let product = state.backend().get_product(&id).await?;
    Ok(Json(product))
}

/// List the distinct catalog categories.
#[instrument(skip(state))]
pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<String>>> {
    let products = state.backend().list_products().await?;
    Ok(Json(catalog::categories(&products)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_is_default_filter() {
        let spec = ProductQuery::default().into_filter().unwrap();
        assert_eq!(spec, FilterSpec::default());
    }

    #[test]
    fn test_query_into_filter() {
        let query = ProductQuery {
            category: Some("Accessories".to_string()),
            q: Some("mouse".to_string()),
            min_price: Some("10".to_string()),
            max_price: Some("49.99".to_string()),
            sort: Some("price-desc".to_string()),
        };

        let spec = query.into_filter().unwrap();
        assert_eq!(spec.category.as_deref(), Some("Accessories"));
        assert_eq!(spec.search, "mouse");
        assert_eq!(spec.min_price, Decimal::from(10));
        assert_eq!(spec.max_price, Decimal::new(4999, 2));
        assert_eq!(spec.sort, SortKey::PriceDesc);
    }

    #[test]
    fn test_blank_bounds_keep_defaults() {
        let query = ProductQuery {
            min_price: Some(String::new()),
            max_price: Some("  ".to_string()),
            sort: Some(String::new()),
            ..ProductQuery::default()
        };

        let spec = query.into_filter().unwrap();
        assert_eq!(spec.min_price, Decimal::ZERO);
        assert_eq!(spec.max_price, Decimal::from(10_000));
        assert_eq!(spec.sort, SortKey::Featured);
    }

    #[test]
    fn test_invalid_price_rejected() {
        let query = ProductQuery {
            min_price: Some("cheap".to_string()),
            ..ProductQuery::default()
        };
        let err = query.into_filter().unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg.contains("min_price")));
    }

    #[test]
    fn test_rail_limit_is_capped() {
        assert_eq!(RailQuery { limit: None }.limit(), DEFAULT_RAIL_LIMIT);
        assert_eq!(RailQuery { limit: Some(3) }.limit(), 3);
        assert_eq!(RailQuery { limit: Some(10_000) }.limit(), MAX_RAIL_LIMIT);
    }

    #[test]
    fn test_invalid_sort_rejected() {
        let query = ProductQuery {
            sort: Some("popularity".to_string()),
            ..ProductQuery::default()
        };
        assert!(matches!(
            query.into_filter(),
            Err(AppError::BadRequest(_))
        ));
    }
}
