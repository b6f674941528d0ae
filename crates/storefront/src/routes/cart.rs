//! Cart route handlers.
//!
//! Each handler loads the client's cart from its session, applies at most
//! one mutation, and writes the cart back before responding. Responses carry
//! the resulting snapshot so the client never has to re-fetch.

use axum::{Json, extract::State};
use pixelwear_core::{Price, ProductId};
use pixelwear_core::cart::{CartKey, CartSnapshot, LineItem};
use pixelwear_core::catalog::ProductView;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::cart_session;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// One cart line as returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct CartLineView {
    /// Key to pass back to `update` and `remove`.
    pub key: CartKey,
    #[serde(flatten)]
    pub item: LineItem,
    pub line_total: Decimal,
    /// `line_total` formatted for display, e.g. `$119.98`.
    pub line_total_display: String,
}

/// Cart display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartLineView>,
    pub total_item_count: u64,
    pub total_price: Decimal,
    /// `total_price` formatted for display.
    pub subtotal: String,
}

impl From<CartSnapshot> for CartView {
    fn from(snapshot: CartSnapshot) -> Self {
        Self {
            items: snapshot
                .items
                .into_iter()
                .map(|item| {
                    let line_total = item.line_total();
                    CartLineView {
                        key: item.key(),
                        line_total,
                        line_total_display: Price::usd(line_total).display(),
                        item,
                    }
                })
                .collect(),
            total_item_count: snapshot.total_item_count,
            total_price: snapshot.total_price,
            subtotal: Price::usd(snapshot.total_price).display(),
        }
    }
}

/// Cart count badge data.
#[derive(Debug, Serialize)]
pub struct CartCount {
    pub count: u64,
}

/// Add to cart request body.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub size: String,
}

/// Update cart request body.
#[derive(Debug, Deserialize)]
pub struct UpdateCartRequest {
    pub key: CartKey,
    /// Zero or negative removes the line.
    pub quantity: i64,
}

/// Remove from cart request body.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartRequest {
    pub key: CartKey,
}

/// Build the line item for `product`, copying its current display data.
fn line_item_for(product: &ProductView, request: &AddToCartRequest) -> LineItem {
    LineItem::new(
        product.id.clone(),
        product.name.clone(),
        product.price,
        request.quantity.unwrap_or(1),
    )
    .with_image(product.image.clone())
    .with_color(request.color.trim())
    .with_size(request.size.trim())
}

/// Show the cart.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Json<CartView> {
    let cart = cart_session::load(&session).await;
    Json(CartView::from(cart.snapshot()))
}

/// Total item count for the header badge.
#[instrument(skip(session))]
pub async fn count(session: Session) -> Json<CartCount> {
    let cart = cart_session::load(&session).await;
    Json(CartCount {
        count: cart.total_item_count(),
    })
}

/// Add an item to the cart, merging with an existing line of the same
/// product, color and size.
#[instrument(skip(state, session), fields(product_id = %request.product_id))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<AddToCartRequest>,
) -> Result<Json<CartView>> {
    if request.product_id.is_empty() {
        return Err(AppError::BadRequest("product_id is required".to_string()));
    }

    let product = state.backend().get_product(&request.product_id).await?;
    let item = line_item_for(&product, &request);

    let mut cart = cart_session::load(&session).await;
    cart.add(item)?;
    let snapshot = cart_session::save(&session, cart).await?;

    tracing::info!(items = snapshot.total_item_count, "Added to cart");
    Ok(Json(CartView::from(snapshot)))
}

/// Set a line's quantity.
#[instrument(skip(session), fields(key = %request.key))]
pub async fn update(
    session: Session,
    Json(request): Json<UpdateCartRequest>,
) -> Result<Json<CartView>> {
    let mut cart = cart_session::load(&session).await;
    cart.update_quantity(&request.key, request.quantity)?;
    let snapshot = cart_session::save(&session, cart).await?;

    Ok(Json(CartView::from(snapshot)))
}

/// Remove a line.
#[instrument(skip(session), fields(key = %request.key))]
pub async fn remove(
    session: Session,
    Json(request): Json<RemoveFromCartRequest>,
) -> Result<Json<CartView>> {
    let mut cart = cart_session::load(&session).await;
    cart.remove(&request.key)?;
    let snapshot = cart_session::save(&session, cart).await?;

    Ok(Json(CartView::from(snapshot)))
}

/// Empty the cart.
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<Json<CartView>> {
    let mut cart = cart_session::load(&session).await;
    cart.clear()?;
    let snapshot = cart_session::save(&session, cart).await?;

    Ok(Json(CartView::from(snapshot)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn hoodie() -> ProductView {
        let mut product = ProductView::new(3, "Zelda Hoodie", Decimal::new(5999, 2), "Hoodies");
        product.image = "https://cdn.pixelwear.dz/zelda.jpg".to_string();
        product.colors = vec!["Green".to_string()];
        product
    }

    #[test]
    fn test_line_item_copies_product_metadata() {
        let request: AddToCartRequest =
            serde_json::from_str(r#"{"product_id": 3, "color": " Green ", "size": "M"}"#).unwrap();

        let item = line_item_for(&hoodie(), &request);
        assert_eq!(item.product_id, ProductId::from(3));
        assert_eq!(item.name, "Zelda Hoodie");
        assert_eq!(item.unit_price, Decimal::new(5999, 2));
        assert_eq!(item.image, "https://cdn.pixelwear.dz/zelda.jpg");
        assert_eq!(item.quantity, 1);
        assert_eq!(item.selected_color, "Green");
        assert_eq!(item.selected_size, "M");
    }

    #[test]
    fn test_add_request_accepts_text_ids() {
        let request: AddToCartRequest =
            serde_json::from_str(r#"{"product_id": "sku-42", "quantity": 3}"#).unwrap();
        assert_eq!(request.product_id, ProductId::from("sku-42"));
        assert_eq!(request.quantity, Some(3));
        assert!(request.color.is_empty());
    }

    #[test]
    fn test_cart_view_exposes_keys_and_line_totals() {
        let item = LineItem::new(3, "Zelda Hoodie", Decimal::new(5999, 2), 2).with_size("M");
        let key = item.key();

        let view = CartView::from(CartSnapshot::from_items(vec![item]));
        assert_eq!(view.total_item_count, 2);
        assert_eq!(view.items[0].key, key);
        assert_eq!(view.items[0].line_total, Decimal::new(11998, 2));
        assert_eq!(view.items[0].line_total_display, "$119.98");
        assert_eq!(view.subtotal, "$119.98");

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["items"][0]["key"], key.as_str());
        assert_eq!(json["items"][0]["name"], "Zelda Hoodie");
    }
}
