//! Pixelwear Storefront library.
//!
//! This crate provides the storefront JSON API as a library,
//! allowing it to be tested and reused.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod cart_session;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::{Router, routing::get};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::state::AppState;

/// Build the storefront router with its middleware stack.
///
/// Sentry layers are added by the binary, outermost.
pub fn app(state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .merge(routes::routes())
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(session_layer)
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the backend.
async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::post;
    use pixelwear_core::checkout::CheckoutPolicy;
    use secrecy::SecretString;
    use tower::ServiceExt;
    use url::Url;

    use super::*;
    use crate::config::{BackendConfig, StorefrontConfig};
    use crate::middleware::request_id::REQUEST_ID_HEADER;

    const SHIPPING_JSON: &str = r#"{"full_name": "Amine B.", "phone": "0550000000",
        "region": "Alger", "address": "12 rue Didouche Mourad"}"#;

    fn test_app() -> Router {
        app_with_backend("http://127.0.0.1:9")
    }

    fn app_with_backend(backend_url: &str) -> Router {
        let config = StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            backend: BackendConfig {
                url: Url::parse(backend_url).unwrap(),
                api_key: SecretString::from("k3Yq9vLmP2xR7tW4zN8bC1dF6gH0jS5"),
                cache_ttl: Duration::from_secs(60),
            },
            checkout: CheckoutPolicy::default(),
            sentry_dsn: None,
            sentry_environment: None,
        };
        app(AppState::new(config))
    }

    /// Serve a one-product catalog and an `orders` table that answers
    /// inserts with `order_status`, on an ephemeral port.
    async fn spawn_backend(order_status: StatusCode) -> String {
        let backend = Router::new()
            .route(
                "/rest/v1/products",
                get(|| async {
                    axum::Json(serde_json::json!([
                        {"id": 3, "name": "Zelda Hoodie", "price": 59.99, "category": "Hoodies"}
                    ]))
                }),
            )
            .route(
                "/rest/v1/orders",
                post(move || async move {
                    let body = if order_status.is_success() {
                        serde_json::json!([{"id": 7}])
                    } else {
                        serde_json::json!({"message": "insert failed"})
                    };
                    (order_status, axum::Json(body))
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, backend).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn json_request(uri: &str, cookie: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::post(uri).header("content-type", "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header("cookie", cookie);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    /// Add one hoodie to a fresh session and return its cookie.
    async fn session_with_hoodie(app: &Router) -> String {
        let response = app
            .clone()
            .oneshot(json_request(
                "/api/cart/add",
                None,
                r#"{"product_id": 3, "quantity": 2, "size": "M"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let set_cookie = response.headers()["set-cookie"].to_str().unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    async fn cart_json(app: &Router, cookie: &str) -> serde_json::Value {
        let response = app
            .clone()
            .oneshot(
                Request::get("/api/cart")
                    .header("cookie", cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
        assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let response = test_app()
            .oneshot(
                Request::get("/health")
                    .header(REQUEST_ID_HEADER, "req-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()[REQUEST_ID_HEADER], "req-123");
    }

    #[tokio::test]
    async fn test_new_session_has_empty_cart() {
        let response = test_app()
            .oneshot(Request::get("/api/cart").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["items"], serde_json::json!([]));
        assert_eq!(json["total_item_count"], 0);
    }

    #[tokio::test]
    async fn test_update_unknown_line_is_noop() {
        let response = test_app()
            .oneshot(
                Request::post("/api/cart/update")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"key": "9::::", "quantity": 4}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["total_item_count"], 0);
    }

    #[tokio::test]
    async fn test_checkout_with_empty_cart_is_rejected() {
        let response = test_app()
            .oneshot(
                Request::post("/api/checkout")
                    .header("content-type", "application/json")
                    .body(Body::from(SHIPPING_JSON))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "cannot check out an empty cart");
    }

    #[tokio::test]
    async fn test_invalid_sort_is_bad_request() {
        let response = test_app()
            .oneshot(
                Request::get("/api/products?sort=popularity")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_checkout_clears_cart_after_order_is_created() {
        let app = app_with_backend(&spawn_backend(StatusCode::CREATED).await);
        let cookie = session_with_hoodie(&app).await;

        let response = app
            .clone()
            .oneshot(json_request("/api/checkout", Some(&cookie), SHIPPING_JSON))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        assert_eq!(json["order_id"], 7);
        assert_eq!(json["totals"]["subtotal"], 119.98);
        assert_eq!(json["totals"]["total"], 131.98);

        let cart = cart_json(&app, &cookie).await;
        assert_eq!(cart["items"], serde_json::json!([]));
        assert_eq!(cart["total_item_count"], 0);
    }

    #[tokio::test]
    async fn test_failed_order_keeps_cart() {
        let app = app_with_backend(&spawn_backend(StatusCode::INTERNAL_SERVER_ERROR).await);
        let cookie = session_with_hoodie(&app).await;
        let before = cart_json(&app, &cookie).await;

        let response = app
            .clone()
            .oneshot(json_request("/api/checkout", Some(&cookie), SHIPPING_JSON))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let json = body_json(response).await;
        assert_eq!(json["error"], "External service error");

        let after = cart_json(&app, &cookie).await;
        assert_eq!(after, before);
        assert_eq!(after["total_item_count"], 2);
        assert_eq!(after["items"][0]["selected_size"], "M");
    }
}
