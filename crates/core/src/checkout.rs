//! Checkout: turning a cart snapshot into an order payload.
//!
//! The payload shape matches the hosted backend's `orders` table: line items
//! are stored as a JSON array, money columns as plain numbers.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cart::{CartSnapshot, LineItem};
use crate::types::ProductId;

/// Errors that can occur when building an order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// The cart has no line items.
    #[error("cannot check out an empty cart")]
    EmptyCart,
    /// A required shipping field is blank.
    #[error("{0} is required")]
    MissingField(&'static str),
    /// Tax or shipping pushes the order total past what a `Decimal` holds.
    #[error("order total is too large")]
    TotalOverflow,
}

/// Customer-supplied shipping fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingDetails {
    pub full_name: String,
    pub phone: String,
    /// Administrative region (wilaya) used for delivery.
    pub region: String,
    pub address: String,
}

impl ShippingDetails {
    /// Trim every field and check none is blank.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::MissingField`] naming the first blank field.
    pub fn validate(self) -> Result<Self, CheckoutError> {
        let details = Self {
            full_name: self.full_name.trim().to_owned(),
            phone: self.phone.trim().to_owned(),
            region: self.region.trim().to_owned(),
            address: self.address.trim().to_owned(),
        };

        for (field, value) in [
            ("full_name", &details.full_name),
            ("phone", &details.phone),
            ("region", &details.region),
            ("address", &details.address),
        ] {
            if value.is_empty() {
                return Err(CheckoutError::MissingField(field));
            }
        }

        Ok(details)
    }
}

/// Tax and shipping rules applied at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutPolicy {
    /// Fraction of the subtotal charged as tax (0.10 = 10 %).
    pub tax_rate: Decimal,
    /// Flat shipping charge per order.
    pub shipping: Decimal,
}

impl Default for CheckoutPolicy {
    fn default() -> Self {
        Self {
            tax_rate: Decimal::new(10, 2),
            shipping: Decimal::ZERO,
        }
    }
}

/// Money totals of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub shipping: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

impl OrderTotals {
    /// Compute totals for a snapshot. Tax and total are rounded to cents.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::TotalOverflow`] if tax or total does not fit
    /// in a [`Decimal`].
    pub fn compute(
        snapshot: &CartSnapshot,
        policy: &CheckoutPolicy,
    ) -> Result<Self, CheckoutError> {
        let subtotal = snapshot.total_price;
        let tax = subtotal
            .checked_mul(policy.tax_rate)
            .map(to_cents)
            .ok_or(CheckoutError::TotalOverflow)?;
        let total = subtotal
            .checked_add(policy.shipping)
            .and_then(|amount| amount.checked_add(tax))
            .map(to_cents)
            .ok_or(CheckoutError::TotalOverflow)?;

        Ok(Self {
            subtotal,
            shipping: policy.shipping,
            tax,
            total,
        })
    }
}

fn to_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// One ordered line as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: u32,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub selected_color: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub selected_size: String,
}

impl From<&LineItem> for OrderLine {
    fn from(item: &LineItem) -> Self {
        Self {
            product_id: item.product_id.clone(),
            name: item.name.clone(),
            price: item.unit_price,
            quantity: item.quantity,
            image_url: item.image.clone(),
            selected_color: item.selected_color.clone(),
            selected_size: item.selected_size.clone(),
        }
    }
}

/// The order-submission payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub full_name: String,
    pub phone: String,
    #[serde(rename = "wilaya")]
    pub region: String,
    pub address: String,
    pub items: Vec<OrderLine>,
    #[serde(flatten)]
    pub totals: OrderTotals,
}

impl OrderDraft {
    /// Build the payload from a complete cart snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] for an empty snapshot,
    /// [`CheckoutError::MissingField`] if a shipping field is blank, or
    /// [`CheckoutError::TotalOverflow`] if the totals do not fit.
    pub fn from_snapshot(
        snapshot: &CartSnapshot,
        shipping: ShippingDetails,
        policy: &CheckoutPolicy,
    ) -> Result<Self, CheckoutError> {
        if snapshot.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let shipping = shipping.validate()?;
        let totals = OrderTotals::compute(snapshot, policy)?;

        Ok(Self {
            full_name: shipping.full_name,
            phone: shipping.phone,
            region: shipping.region,
            address: shipping.address,
            items: snapshot.items.iter().map(OrderLine::from).collect(),
            totals,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn details() -> ShippingDetails {
        ShippingDetails {
            full_name: "  Amine B. ".to_string(),
            phone: "0550 00 00 00".to_string(),
            region: "Alger".to_string(),
            address: "12 rue Didouche Mourad".to_string(),
        }
    }

    fn snapshot() -> CartSnapshot {
        CartSnapshot::from_items(vec![
            LineItem::new(1, "Hoodie", Decimal::new(5999, 2), 2)
                .with_image("hoodie.jpg")
                .with_color("Black"),
            LineItem::new(5, "Socks", Decimal::new(1499, 2), 1),
        ])
    }

    #[test]
    fn test_totals_default_policy() {
        let totals = OrderTotals::compute(&snapshot(), &CheckoutPolicy::default()).unwrap();
        assert_eq!(totals.subtotal, Decimal::new(13497, 2));
        assert_eq!(totals.shipping, Decimal::ZERO);
        // 134.97 * 0.10 = 13.497 -> 13.50
        assert_eq!(totals.tax, Decimal::new(1350, 2));
        assert_eq!(totals.total, Decimal::new(14847, 2));
    }

    #[test]
    fn test_totals_with_shipping() {
        let policy = CheckoutPolicy {
            tax_rate: Decimal::ZERO,
            shipping: Decimal::new(500, 2),
        };
        let totals = OrderTotals::compute(&snapshot(), &policy).unwrap();
        assert_eq!(totals.total, Decimal::new(13997, 2));
    }

    #[test]
    fn test_totals_overflow_is_an_error() {
        let snapshot = CartSnapshot::from_items(vec![LineItem::new(1, "A", Decimal::MAX, 1)]);
        assert_eq!(
            OrderTotals::compute(&snapshot, &CheckoutPolicy::default()),
            Err(CheckoutError::TotalOverflow)
        );

        let untaxed = CheckoutPolicy {
            tax_rate: Decimal::ZERO,
            shipping: Decimal::ZERO,
        };
        let totals = OrderTotals::compute(&snapshot, &untaxed).unwrap();
        assert_eq!(totals.total, Decimal::MAX);
    }

    #[test]
    fn test_draft_from_snapshot() {
        let draft =
            OrderDraft::from_snapshot(&snapshot(), details(), &CheckoutPolicy::default()).unwrap();
        assert_eq!(draft.full_name, "Amine B.");
        assert_eq!(draft.items.len(), 2);
        assert_eq!(draft.items[0].image_url, "hoodie.jpg");
        assert_eq!(draft.items[0].selected_color, "Black");
        assert_eq!(draft.items[0].quantity, 2);
    }

    #[test]
    fn test_draft_payload_shape() {
        let draft =
            OrderDraft::from_snapshot(&snapshot(), details(), &CheckoutPolicy::default()).unwrap();
        let json = serde_json::to_value(&draft).unwrap();

        assert_eq!(json["wilaya"], "Alger");
        assert!(json.get("region").is_none());
        assert_eq!(json["subtotal"], 134.97);
        assert_eq!(json["tax"], 13.5);
        assert_eq!(json["items"][0]["price"], 59.99);
        assert_eq!(json["items"][0]["selected_color"], "Black");
        assert!(json["items"][1].get("selected_color").is_none());
    }

    #[test]
    fn test_empty_cart_rejected() {
        let result = OrderDraft::from_snapshot(
            &CartSnapshot::from_items(Vec::new()),
            details(),
            &CheckoutPolicy::default(),
        );
        assert_eq!(result, Err(CheckoutError::EmptyCart));
    }

    #[test]
    fn test_blank_field_rejected() {
        let mut shipping = details();
        shipping.phone = "   ".to_string();
        assert_eq!(
            shipping.validate(),
            Err(CheckoutError::MissingField("phone"))
        );
    }
}
