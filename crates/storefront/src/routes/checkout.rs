//! Checkout route handler.

use axum::{Json, extract::State, http::StatusCode};
use pixelwear_core::OrderId;
use pixelwear_core::checkout::{OrderDraft, OrderTotals, ShippingDetails};
use serde::Serialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::cart_session;
use crate::error::{Result, add_breadcrumb};
use crate::state::AppState;

/// Confirmation returned once the backend accepted the order.
#[derive(Debug, Serialize)]
pub struct OrderConfirmation {
    pub order_id: OrderId,
    pub totals: OrderTotals,
}

/// Place an order for the current cart.
///
/// The cart is cleared only after the backend confirmed the order, so a
/// failed submission leaves it intact for a retry.
#[instrument(skip(state, session, details))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    Json(details): Json<ShippingDetails>,
) -> Result<(StatusCode, Json<OrderConfirmation>)> {
    let mut cart = cart_session::load(&session).await;
    let draft = OrderDraft::from_snapshot(&cart.snapshot(), details, &state.config().checkout)?;

    add_breadcrumb("checkout", "Submitting order", None);
    let order_id = state.backend().submit_order(&draft).await?;

    cart.clear()?;
    cart_session::save(&session, cart).await?;

    tracing::info!(order_id = %order_id, total = %draft.totals.total, "Checkout complete");
    Ok((
        StatusCode::CREATED,
        Json(OrderConfirmation {
            order_id,
            totals: draft.totals,
        }),
    ))
}
