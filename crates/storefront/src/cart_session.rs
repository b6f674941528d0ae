//! Session-backed cart persistence.
//!
//! Each client's serialized cart lives in its session under
//! [`CART_STORAGE_KEY`], the same single-key layout the cart store uses for
//! any medium. A request stages the payload in a [`MemoryStorage`], lets the
//! [`CartStore`] mutate and rewrite it synchronously, then flushes it back
//! to the session.
//!
//! Two concurrent requests from the same client are last-write-wins.

use pixelwear_core::cart::{CART_STORAGE_KEY, CartSnapshot, CartStore, MemoryStorage};
use tower_sessions::Session;
use tracing::warn;

use crate::error::add_breadcrumb;

/// A cart staged for one request.
pub type SessionCart = CartStore<MemoryStorage>;

/// Hydrate the cart stored in `session`.
///
/// Never fails: an unreadable session entry yields an empty cart.
pub async fn load(session: &Session) -> SessionCart {
    let storage = match session.get::<String>(CART_STORAGE_KEY).await {
        Ok(Some(payload)) => MemoryStorage::with_entry(CART_STORAGE_KEY, payload),
        Ok(None) => MemoryStorage::new(),
        Err(e) => {
            warn!(error = %e, "Failed to read cart from session, starting empty");
            MemoryStorage::new()
        }
    };

    let mut cart = CartStore::hydrate(storage);
    cart.subscribe(|snapshot| {
        let items = snapshot.total_item_count.to_string();
        add_breadcrumb("cart", "Cart updated", Some(&[("items", items.as_str())]));
    });
    cart
}

/// Flush the cart payload back to `session` and return the final snapshot.
///
/// # Errors
///
/// Returns an error if the session store rejects the write.
pub async fn save(
    session: &Session,
    cart: SessionCart,
) -> Result<CartSnapshot, tower_sessions::session::Error> {
    let snapshot = cart.snapshot();
    let storage = cart.into_storage();

    if let Some(payload) = storage.get(CART_STORAGE_KEY) {
        session.insert(CART_STORAGE_KEY, payload).await?;
    }

    Ok(snapshot)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use pixelwear_core::cart::LineItem;
    use rust_decimal::Decimal;
    use tower_sessions::MemoryStore;

    use super::*;

    fn new_session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_cart_survives_requests() {
        let session = new_session();

        let mut cart = load(&session).await;
        assert!(cart.is_empty());
        cart.add(
            LineItem::new(1, "PlayStation Logo Hoodie", Decimal::new(5999, 2), 1).with_size("L"),
        )
        .unwrap();
        save(&session, cart).await.unwrap();

        let mut cart = load(&session).await;
        cart.add(
            LineItem::new(1, "PlayStation Logo Hoodie", Decimal::new(5999, 2), 2).with_size("L"),
        )
        .unwrap();
        let snapshot = save(&session, cart).await.unwrap();

        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.total_item_count, 3);
        assert_eq!(snapshot.total_price, Decimal::new(17997, 2));

        let reloaded = load(&session).await;
        assert_eq!(reloaded.items(), snapshot.items.as_slice());
    }

    #[tokio::test]
    async fn test_malformed_session_payload_is_empty_cart() {
        let session = new_session();
        session
            .insert(CART_STORAGE_KEY, "{not a cart")
            .await
            .unwrap();

        let cart = load(&session).await;
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_untouched_cart_writes_nothing() {
        let session = new_session();
        let cart = load(&session).await;
        let snapshot = save(&session, cart).await.unwrap();

        assert!(snapshot.is_empty());
        assert!(
            session
                .get::<String>(CART_STORAGE_KEY)
                .await
                .unwrap()
                .is_none()
        );
    }
}
