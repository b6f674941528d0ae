//! Persistence medium for the cart.
//!
//! The cart is stored as one serialized payload under one key. Reads happen
//! once at hydration, writes overwrite the whole payload after every mutation.

use std::collections::HashMap;

use thiserror::Error;

/// Key under which the serialized cart is stored.
pub const CART_STORAGE_KEY: &str = "cart";

/// Errors raised by a storage medium.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying I/O failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The cart could not be serialized.
    #[error("failed to encode cart: {0}")]
    Encode(#[from] serde_json::Error),

    /// The medium rejected the operation.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// A key-value medium holding serialized cart payloads.
pub trait CartStorage {
    /// Read the payload stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the medium cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite the payload stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the medium cannot be written.
    fn write(&mut self, key: &str, payload: &str) -> Result<(), StorageError>;
}

/// In-memory storage.
///
/// Used by tests and as the staging medium between a request and its session.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    /// Create an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a storage pre-populated with one entry.
    #[must_use]
    pub fn with_entry(key: impl Into<String>, payload: impl Into<String>) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.into(), payload.into());
        Self { entries }
    }

    /// Borrow the payload under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl CartStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, payload: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_owned(), payload.to_owned());
        Ok(())
    }
}
