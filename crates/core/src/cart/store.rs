//! The cart store: merge-by-key line items with write-through persistence.

use core::fmt;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::{
    CART_STORAGE_KEY, CartError, CartKey, CartSnapshot, CartStorage, LineItem, StorageError,
    checked_total_price, total_item_count, total_price,
};

type Listener = Box<dyn Fn(&CartSnapshot) + Send + Sync>;

/// Authoritative line items for one client session.
///
/// # Example
///
/// ```
/// use pixelwear_core::cart::{CartStore, LineItem, MemoryStorage};
/// use rust_decimal::Decimal;
///
/// let mut cart = CartStore::hydrate(MemoryStorage::new());
/// cart.add(LineItem::new(1, "Hoodie", Decimal::new(5999, 2), 1).with_color("Black"))?;
/// cart.add(LineItem::new(1, "Hoodie", Decimal::new(5999, 2), 2).with_color("Black"))?;
///
/// assert_eq!(cart.len(), 1);
/// assert_eq!(cart.total_item_count(), 3);
/// # Ok::<(), pixelwear_core::cart::CartError>(())
/// ```
pub struct CartStore<S> {
    items: Vec<LineItem>,
    storage: S,
    listeners: Vec<Listener>,
}

impl<S: CartStorage> CartStore<S> {
    /// Create a store from whatever `storage` holds under [`CART_STORAGE_KEY`].
    ///
    /// Missing, unreadable, or malformed payloads yield an empty cart. The
    /// failure is logged, never returned.
    pub fn hydrate(storage: S) -> Self {
        let items = match storage.read(CART_STORAGE_KEY) {
            Ok(Some(payload)) => decode(&payload),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read persisted cart, starting empty");
                Vec::new()
            }
        };

        Self {
            items,
            storage,
            listeners: Vec::new(),
        }
    }

    /// Add an item, merging with an existing entry that has the same key.
    ///
    /// On merge only the quantity changes; the existing entry keeps its
    /// name, price and image. A quantity of zero is treated as one.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NegativePrice`] or [`CartError::TotalOverflow`]
    /// without touching the cart if the unit price is negative or the new
    /// total would not fit in a [`Decimal`]. Returns [`CartError::Storage`]
    /// if persisting fails.
    pub fn add(&mut self, mut item: LineItem) -> Result<(), CartError> {
        if item.unit_price < Decimal::ZERO {
            return Err(CartError::NegativePrice(item.unit_price));
        }
        item.quantity = item.quantity.max(1);

        let key = item.key();
        let mut items = self.items.clone();
        if let Some(existing) = items.iter_mut().find(|i| i.key() == key) {
            existing.quantity = existing.quantity.saturating_add(item.quantity);
            debug!(key = %key, quantity = existing.quantity, "Merged cart line");
        } else {
            debug!(key = %key, quantity = item.quantity, "Added cart line");
            items.push(item);
        }

        self.replace(items)
    }

    /// Remove the entry with `key`. Absent keys are a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] if persisting fails.
    pub fn remove(&mut self, key: &CartKey) -> Result<(), CartError> {
        let before = self.items.len();
        self.items.retain(|i| &i.key() != key);
        if self.items.len() == before {
            return Ok(());
        }
        self.commit()
    }

    /// Set the quantity of the entry with `key`.
    ///
    /// A quantity of zero or below removes the entry. Absent keys are a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::TotalOverflow`] without touching the cart if the
    /// new total would not fit in a [`Decimal`], or [`CartError::Storage`] if
    /// persisting fails.
    pub fn update_quantity(&mut self, key: &CartKey, quantity: i64) -> Result<(), CartError> {
        if quantity <= 0 {
            return self.remove(key);
        }

        let mut items = self.items.clone();
        let Some(entry) = items.iter_mut().find(|i| &i.key() == key) else {
            return Ok(());
        };
        entry.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        self.replace(items)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] if persisting fails.
    pub fn clear(&mut self) -> Result<(), CartError> {
        self.items.clear();
        self.commit()
    }

    /// Register a listener called with a fresh snapshot after every mutation.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: Fn(&CartSnapshot) + Send + Sync + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Look up an entry by key.
    #[must_use]
    pub fn get(&self, key: &CartKey) -> Option<&LineItem> {
        self.items.iter().find(|i| &i.key() == key)
    }

    /// Number of distinct line items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the cart has no line items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities.
    #[must_use]
    pub fn total_item_count(&self) -> u64 {
        total_item_count(&self.items)
    }

    /// Sum of `unit_price * quantity`.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        total_price(&self.items)
    }

    /// Copy of the current items with derived totals.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot::from_items(self.items.clone())
    }

    /// Borrow the storage medium.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Consume the store and return its storage medium.
    #[must_use]
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Swap in `items` and commit, unless their total overflows.
    fn replace(&mut self, items: Vec<LineItem>) -> Result<(), CartError> {
        if checked_total_price(&items).is_none() {
            return Err(CartError::TotalOverflow);
        }
        self.items = items;
        self.commit()
    }

    /// Persist the full collection, then notify listeners.
    ///
    /// Listeners run even when the write fails: the in-memory state has
    /// already changed.
    fn commit(&mut self) -> Result<(), CartError> {
        let result = self.persist();
        if let Err(e) = &result {
            warn!(error = %e, "Failed to persist cart");
        }

        if !self.listeners.is_empty() {
            let snapshot = self.snapshot();
            for listener in &self.listeners {
                listener(&snapshot);
            }
        }

        result.map_err(CartError::from)
    }

    fn persist(&mut self) -> Result<(), StorageError> {
        let payload = serde_json::to_string(&self.items)?;
        self.storage.write(CART_STORAGE_KEY, &payload)
    }
}

impl<S: fmt::Debug> fmt::Debug for CartStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("items", &self.items)
            .field("storage", &self.storage)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Decode a persisted payload, dropping entries with a zero quantity.
fn decode(payload: &str) -> Vec<LineItem> {
    match serde_json::from_str::<Vec<LineItem>>(payload) {
        Ok(mut items) => {
            items.retain(|i| i.quantity > 0);
            if checked_total_price(&items).is_none() {
                warn!("Persisted cart total overflows, starting empty");
                return Vec::new();
            }
            items
        }
        Err(e) => {
            warn!(error = %e, "Persisted cart is malformed, starting empty");
            Vec::new()
        }
    }
}
