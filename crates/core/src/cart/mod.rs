//! Shopping cart state.
//!
//! # Architecture
//!
//! [`CartStore`] owns the line items for one client and a [`CartStorage`]
//! medium. It is passed explicitly to whatever needs it; there is no global
//! cart. Every mutation rewrites the whole payload to storage and notifies
//! subscribers with a fresh [`CartSnapshot`].
//!
//! Totals are never stored. They are recomputed from the line items each
//! time they are read.
//!
//! # Concurrency
//!
//! The store assumes a single writer. Two stores hydrated from the same
//! storage key overwrite each other (last write wins).

mod item;
mod storage;
mod store;

pub use item::{CartKey, LineItem};
pub use storage::{CART_STORAGE_KEY, CartStorage, MemoryStorage, StorageError};
pub use store::CartStore;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by cart mutations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The item carries a negative unit price.
    #[error("unit price cannot be negative (got {0})")]
    NegativePrice(Decimal),

    /// The mutation would push the cart total past what a `Decimal` holds.
    #[error("cart total would overflow")]
    TotalOverflow,

    /// The mutation was applied in memory but could not be persisted.
    #[error("failed to persist cart: {0}")]
    Storage(#[from] StorageError),
}

/// Point-in-time view of the cart with derived totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSnapshot {
    /// Line items in insertion order.
    pub items: Vec<LineItem>,
    /// Sum of all quantities.
    pub total_item_count: u64,
    /// Sum of `unit_price * quantity`.
    pub total_price: Decimal,
}

impl CartSnapshot {
    /// Build a snapshot, deriving totals from the items.
    #[must_use]
    pub fn from_items(items: Vec<LineItem>) -> Self {
        let total_item_count = total_item_count(&items);
        let total_price = total_price(&items);
        Self {
            items,
            total_item_count,
            total_price,
        }
    }

    /// Returns true if the snapshot has no line items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

pub(crate) fn total_item_count(items: &[LineItem]) -> u64 {
    items.iter().map(|item| u64::from(item.quantity)).sum()
}

pub(crate) fn total_price(items: &[LineItem]) -> Decimal {
    items
        .iter()
        .map(LineItem::line_total)
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

/// The cart total, or `None` if any line or the sum overflows.
pub(crate) fn checked_total_price(items: &[LineItem]) -> Option<Decimal> {
    items.iter().try_fold(Decimal::ZERO, |total, item| {
        total.checked_add(item.checked_line_total()?)
    })
}
