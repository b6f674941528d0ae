//! Mapping of backend product records into [`ProductView`].
//!
//! Backend rows are loosely shaped: most columns are nullable, the main image
//! lives in `image`, `image_url`, or the first entry of `images` depending on
//! which admin screen created the product, and IDs are UUID strings while the
//! demo export uses integers. Everything is normalized here.

use std::str::FromStr;

use pixelwear_core::ProductId;
use pixelwear_core::catalog::ProductView;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

/// Errors converting a single record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// The record could not be decoded at all.
    #[error("malformed record: {0}")]
    Malformed(String),
    /// A required field is missing or blank.
    #[error("missing field: {0}")]
    MissingField(&'static str),
    /// The price is absent, non-numeric, or negative.
    #[error("invalid price: {0}")]
    InvalidPrice(String),
}

/// A `products` row as returned by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductRecord {
    pub id: ProductId,
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<Value>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    /// JSON column; anything other than an array of strings is ignored.
    #[serde(default)]
    pub images: Option<Value>,
    #[serde(default)]
    pub colors: Option<Vec<String>>,
    #[serde(default)]
    pub sizes: Option<Vec<String>>,
    #[serde(default)]
    pub featured: Option<bool>,
    #[serde(default, alias = "new")]
    pub is_new: Option<bool>,
}

/// Parse a price that may arrive as a JSON number or a numeric string.
fn parse_price(value: Option<&Value>) -> Result<Decimal, ConversionError> {
    let text = match value {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.trim().to_owned(),
        Some(other) => return Err(ConversionError::InvalidPrice(other.to_string())),
        None => return Err(ConversionError::MissingField("price")),
    };

    let price = Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| ConversionError::InvalidPrice(text.clone()))?;

    if price < Decimal::ZERO {
        return Err(ConversionError::InvalidPrice(text));
    }
    Ok(price)
}

/// String entries of a JSON array, blanks dropped.
fn string_array(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(entries)) => entries
            .iter()
            .filter_map(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_owned)
            .collect(),
        _ => Vec::new(),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Convert one record into a [`ProductView`].
///
/// # Errors
///
/// Returns a [`ConversionError`] if the name is blank or the price is not a
/// non-negative number.
pub fn convert_product(record: ProductRecord) -> Result<ProductView, ConversionError> {
    let name = non_blank(record.name).ok_or(ConversionError::MissingField("name"))?;
    let price = parse_price(record.price.as_ref())?;
    let images = string_array(record.images.as_ref());

    // Admin ordering wins: first gallery image, then the legacy columns
    let image = images
        .first()
        .cloned()
        .or_else(|| non_blank(record.image))
        .or_else(|| non_blank(record.image_url))
        .unwrap_or_default();

    Ok(ProductView {
        id: record.id,
        name: name.trim().to_owned(),
        description: record.description.unwrap_or_default(),
        price,
        category: record.category.unwrap_or_default().trim().to_owned(),
        image,
        images,
        colors: record.colors.unwrap_or_default(),
        sizes: record.sizes.unwrap_or_default(),
        featured: record.featured.unwrap_or(false),
        is_new: record.is_new.unwrap_or(false),
    })
}

/// Decode and convert one raw JSON row.
///
/// # Errors
///
/// Returns a [`ConversionError`] if the row cannot be decoded or converted.
pub fn convert_value(value: Value) -> Result<ProductView, ConversionError> {
    let record: ProductRecord =
        serde_json::from_value(value).map_err(|e| ConversionError::Malformed(e.to_string()))?;
    convert_product(record)
}

/// Convert a list of raw rows, skipping rows that fail to convert.
///
/// Upstream order is preserved.
#[must_use]
pub fn convert_products(values: Vec<Value>) -> Vec<ProductView> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match convert_value(value) {
            Ok(product) => Some(product),
            Err(e) => {
                warn!(index, error = %e, "Skipping product record");
                None
            }
        })
        .collect()
}
