//! Cart line items and their identity keys.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::ProductId;

/// Separator between the parts of a [`CartKey`].
const KEY_SEPARATOR: &str = "::";

/// One row in the cart: a product variant and how many of it.
///
/// Display metadata (`name`, `unit_price`, `image`) is copied when the item is
/// added and never re-fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    #[serde(default)]
    pub image: String,
    pub quantity: u32,
    #[serde(default)]
    pub selected_color: String,
    #[serde(default)]
    pub selected_size: String,
}

impl LineItem {
    /// Create a line item with no variant selected.
    #[must_use]
    pub fn new(
        product_id: impl Into<ProductId>,
        name: impl Into<String>,
        unit_price: Decimal,
        quantity: u32,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            name: name.into(),
            unit_price,
            image: String::new(),
            quantity,
            selected_color: String::new(),
            selected_size: String::new(),
        }
    }

    /// Set the image reference.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    /// Set the selected color variant.
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.selected_color = color.into();
        self
    }

    /// Set the selected size variant.
    #[must_use]
    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.selected_size = size.into();
        self
    }

    /// The identity key deciding whether two additions merge.
    #[must_use]
    pub fn key(&self) -> CartKey {
        CartKey::new(&self.product_id, &self.selected_color, &self.selected_size)
    }

    /// `unit_price * quantity`, saturating at [`Decimal::MAX`].
    ///
    /// Items held by a [`CartStore`](super::CartStore) never saturate.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price.saturating_mul(Decimal::from(self.quantity))
    }

    /// `unit_price * quantity`, or `None` if it does not fit in a [`Decimal`].
    #[must_use]
    pub fn checked_line_total(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity))
    }
}

/// Identity key of a line item: `product_id::color::size`.
///
/// Same product with a different color or size yields a different key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartKey(String);

impl CartKey {
    /// Build the key from its parts.
    #[must_use]
    pub fn new(product_id: &ProductId, color: &str, size: &str) -> Self {
        Self(format!(
            "{product_id}{KEY_SEPARATOR}{color}{KEY_SEPARATOR}{size}"
        ))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CartKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for CartKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<&str> for CartKey {
    fn from(key: &str) -> Self {
        Self(key.to_owned())
    }
}
