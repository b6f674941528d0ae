//! Hosted backend client (products and orders).
//!
//! # Architecture
//!
//! - The backend exposes a PostgREST-style REST API under `/rest/v1/`
//! - The backend is the source of truth - NO local sync, direct API calls
//! - The product list is cached in memory via `moka` (TTL from config)
//! - Rows are mapped into strict core types on receipt, see [`conversions`]
//!
//! # Example
//!
//! ```rust,ignore
//! use pixelwear_storefront::backend::BackendClient;
//!
//! let client = BackendClient::new(&config.backend);
//! let products = client.list_products().await?;
//! let order_id = client.submit_order(&draft).await?;
//! ```

mod cache;
pub mod conversions;

use std::sync::Arc;

use moka::future::Cache;
use pixelwear_core::catalog::{self, ProductView};
use pixelwear_core::checkout::OrderDraft;
use pixelwear_core::{OrderId, ProductId};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::config::BackendConfig;
use cache::{CacheKey, CacheValue};

/// Maximum number of characters of a response body kept in errors and logs.
const BODY_EXCERPT_CHARS: usize = 200;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: StatusCode,
        /// Excerpt of the response body.
        body: String,
    },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The backend returned a row that could not be mapped.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

/// Row returned by the order insert.
#[derive(Debug, Deserialize)]
struct CreatedOrder {
    id: OrderId,
}

// =============================================================================
// BackendClient
// =============================================================================

/// Client for the hosted backend.
///
/// Cheaply cloneable; clones share the HTTP connection pool and cache.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    rest_url: Url,
    api_key: SecretString,
    cache: Cache<CacheKey, CacheValue>,
}

impl BackendClient {
    /// Create a new backend client.
    #[must_use]
    pub fn new(config: &BackendConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(100)
            .time_to_live(config.cache_ttl)
            .build();

        Self {
            inner: Arc::new(BackendClientInner {
                client: reqwest::Client::new(),
                rest_url: rest_url(&config.url),
                api_key: config.api_key.clone(),
                cache,
            }),
        }
    }

    /// Build a request with the auth headers the backend expects.
    fn request(&self, method: reqwest::Method, table: &str) -> reqwest::RequestBuilder {
        let key = self.inner.api_key.expose_secret();
        let url = self
            .inner
            .rest_url
            .join(table)
            .unwrap_or_else(|_| self.inner.rest_url.clone());

        self.inner
            .client
            .request(method, url)
            .header("apikey", key)
            .bearer_auth(key)
    }

    /// Send a request and decode its JSON body.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, BackendError> {
        let response = request.send().await?;
        let status = response.status();

        // Check for rate limiting
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(BackendError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;
        let excerpt: String = response_text.chars().take(BODY_EXCERPT_CHARS).collect();

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %excerpt,
                "Backend returned non-success status"
            );
            return Err(BackendError::Status {
                status,
                body: excerpt,
            });
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(error = %e, body = %excerpt, "Failed to parse backend response");
            BackendError::Parse(e)
        })
    }

    /// Fetch the full catalog, newest first.
    ///
    /// Rows that cannot be mapped are skipped. The result is cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a JSON array.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Arc<Vec<ProductView>>, BackendError> {
        if let Some(CacheValue::Products(products)) =
            self.inner.cache.get(&CacheKey::Products).await
        {
            debug!("Cache hit for product list");
            return Ok(products);
        }

        let request = self
            .request(reqwest::Method::GET, "products")
            .query(&[("select", "*"), ("order", "created_at.desc")]);
        let rows: Vec<serde_json::Value> = self.send(request).await?;
        let products = Arc::new(conversions::convert_products(rows));
        debug!(count = products.len(), "Fetched product list");

        self.inner
            .cache
            .insert(CacheKey::Products, CacheValue::Products(Arc::clone(&products)))
            .await;

        Ok(products)
    }

    /// Fetch one product.
    ///
    /// Served from the cached list when possible.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] if no product has this ID, or
    /// [`BackendError::InvalidRecord`] if the row cannot be mapped.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<ProductView, BackendError> {
        if let Some(CacheValue::Products(products)) =
            self.inner.cache.get(&CacheKey::Products).await
            && let Some(product) = catalog::find(&products, id)
        {
            debug!("Cache hit for product");
            return Ok(product.clone());
        }

        let filter = format!("eq.{id}");
        let request = self
            .request(reqwest::Method::GET, "products")
            .query(&[("select", "*"), ("id", filter.as_str()), ("limit", "1")]);
        let rows: Vec<serde_json::Value> = self.send(request).await?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::NotFound(format!("product {id}")))?;

        conversions::convert_value(row).map_err(|e| BackendError::InvalidRecord(e.to_string()))
    }

    /// Insert an order and return the ID the backend assigned.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend does not echo
    /// back the created row.
    #[instrument(skip(self, draft), fields(items = draft.items.len(), total = %draft.totals.total))]
    pub async fn submit_order(&self, draft: &OrderDraft) -> Result<OrderId, BackendError> {
        let request = self
            .request(reqwest::Method::POST, "orders")
            .query(&[("select", "id")])
            .header("Prefer", "return=representation")
            .json(&[draft]);

        let created: Vec<CreatedOrder> = self.send(request).await?;
        let order = created
            .into_iter()
            .next()
            .ok_or_else(|| {
                BackendError::InvalidRecord("order insert returned no rows".to_string())
            })?;

        tracing::info!(order_id = %order.id, "Order created");
        Ok(order.id)
    }
}

/// The REST root for a backend base URL.
fn rest_url(base: &Url) -> Url {
    let mut url = base.clone();
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.join("rest/v1/").unwrap_or(url)
}
