//! Cart commands over a local directory.
//!
//! # Usage
//!
//! ```bash
//! pw-cli cart add --dir ./cart --product-id 3 --name "Zelda Hoodie" --price 59.99 --size M
//! pw-cli cart update --dir ./cart --key "3::::M" --quantity 2
//! pw-cli cart show --dir ./cart
//! ```

use std::path::Path;

use pixelwear_core::cart::{CartError, CartKey, CartStore, LineItem};
use pixelwear_core::ProductId;
use rust_decimal::Decimal;
use thiserror::Error;

use super::print_json;
use crate::storage::FileStorage;

/// Errors that can occur during cart commands.
#[derive(Debug, Error)]
pub enum CartCommandError {
    /// The mutation was rejected or could not be saved.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Output could not be rendered.
    #[error("Failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

/// Fields of a line item given on the command line.
#[derive(Debug, Clone)]
pub struct NewLine {
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    pub image: String,
    pub color: String,
    pub size: String,
}

fn open(dir: &Path) -> CartStore<FileStorage> {
    let cart = CartStore::hydrate(FileStorage::new(dir));
    tracing::debug!(dir = %dir.display(), lines = cart.len(), "Cart loaded");
    cart
}

/// Print the cart snapshot.
///
/// # Errors
///
/// Returns an error if the output cannot be rendered.
pub fn show(dir: &Path) -> Result<(), CartCommandError> {
    print_json(&open(dir).snapshot())?;
    Ok(())
}

/// Add a line, merging with an existing line of the same variant.
///
/// # Errors
///
/// Returns an error if the price is negative or the cart cannot be saved.
pub fn add(dir: &Path, line: NewLine) -> Result<(), CartCommandError> {
    let item = LineItem::new(line.product_id, line.name, line.price, line.quantity)
        .with_image(line.image)
        .with_color(line.color)
        .with_size(line.size);

    let mut cart = open(dir);
    cart.add(item)?;
    print_json(&cart.snapshot())?;
    Ok(())
}

/// Set a line's quantity. Zero or below removes it.
///
/// # Errors
///
/// Returns an error if the cart cannot be saved.
pub fn update(dir: &Path, key: &str, quantity: i64) -> Result<(), CartCommandError> {
    let mut cart = open(dir);
    let key = CartKey::from(key);
    if cart.get(&key).is_none() {
        tracing::warn!(key = %key, "No such line, cart unchanged");
    }
    cart.update_quantity(&key, quantity)?;
    print_json(&cart.snapshot())?;
    Ok(())
}

/// Remove a line.
///
/// # Errors
///
/// Returns an error if the cart cannot be saved.
pub fn remove(dir: &Path, key: &str) -> Result<(), CartCommandError> {
    let mut cart = open(dir);
    let key = CartKey::from(key);
    if cart.get(&key).is_none() {
        tracing::warn!(key = %key, "No such line, cart unchanged");
    }
    cart.remove(&key)?;
    print_json(&cart.snapshot())?;
    Ok(())
}

/// Empty the cart.
///
/// # Errors
///
/// Returns an error if the cart cannot be saved.
pub fn clear(dir: &Path) -> Result<(), CartCommandError> {
    let mut cart = open(dir);
    cart.clear()?;
    tracing::info!(dir = %cart.storage().dir().display(), "Cart cleared");
    print_json(&cart.snapshot())?;
    Ok(())
}
