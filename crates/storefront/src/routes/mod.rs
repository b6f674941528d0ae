//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                  - Health check
//!
//! # Catalog
//! GET  /api/products            - Filtered view (category, q, min_price, max_price, sort)
//! GET  /api/products/featured   - Featured products (limit)
//! GET  /api/products/new        - New arrivals (limit)
//! GET  /api/products/{id}       - Product detail
//! GET  /api/categories          - Distinct categories
//!
//! # Cart (session-backed)
//! GET  /api/cart                - Cart snapshot
//! GET  /api/cart/count          - Total item count
//! POST /api/cart/add            - Add or merge a line
//! POST /api/cart/update         - Set a line's quantity
//! POST /api/cart/remove         - Remove a line
//! POST /api/cart/clear          - Empty the cart
//!
//! # Checkout
//! POST /api/checkout            - Submit an order, then clear the cart
//! ```

pub mod cart;
pub mod checkout;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/featured", get(products::featured))
        .route("/new", get(products::new_arrivals))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/count", get(cart::count))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
}

/// Create all API routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/products", product_routes())
        .route("/api/categories", get(products::categories))
        .nest("/api/cart", cart_routes())
        .route("/api/checkout", post(checkout::submit))
}
