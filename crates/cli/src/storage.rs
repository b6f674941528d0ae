//! Directory-backed cart storage.
//!
//! Each key is stored as `<dir>/<key>.json`. Writes go to a temporary file
//! first and are renamed into place, so a crash never leaves a torn payload.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use pixelwear_core::cart::{CartStorage, StorageError};

/// [`CartStorage`] over a directory on disk.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Use `dir` for storage. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The file holding `key`.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// The storage directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl CartStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(payload) => Ok(Some(payload)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, key: &str, payload: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;

        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");

        let mut file = fs::File::create(&tmp)?;
        file.write_all(payload.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp, &path)?;

        tracing::debug!(path = %path.display(), bytes = payload.len(), "Cart written");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pixelwear_core::cart::{CART_STORAGE_KEY, CartStore, LineItem};
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        assert!(storage.read(CART_STORAGE_KEY).unwrap().is_none());
    }

    #[test]
    fn test_write_creates_directory_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("carts").join("default");
        let mut storage = FileStorage::new(&nested);

        storage.write(CART_STORAGE_KEY, "[]").unwrap();

        assert_eq!(storage.read(CART_STORAGE_KEY).unwrap().as_deref(), Some("[]"));
        let entries: Vec<_> = fs::read_dir(&nested).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert!(storage.path_for(CART_STORAGE_KEY).ends_with("cart.json"));
    }

    #[test]
    fn test_cart_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();

        let mut cart = CartStore::hydrate(FileStorage::new(dir.path()));
        cart.add(LineItem::new(5, "Controller Mug", Decimal::new(1499, 2), 2).with_color("Black"))
            .unwrap();
        cart.add(LineItem::new(6, "Pixel Sticker Pack", Decimal::new(499, 2), 1))
            .unwrap();
        let before = cart.snapshot();
        drop(cart);

        let reopened = CartStore::hydrate(FileStorage::new(dir.path()));
        assert_eq!(reopened.snapshot(), before);
        assert_eq!(reopened.total_item_count(), 3);
        assert_eq!(reopened.total_price(), Decimal::new(3497, 2));
    }

    #[test]
    fn test_corrupt_file_hydrates_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("cart.json"), "{\"items\": oops").unwrap();

        let cart = CartStore::hydrate(FileStorage::new(dir.path()));
        assert!(cart.is_empty());
    }
}
