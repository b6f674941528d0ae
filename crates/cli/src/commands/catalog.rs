//! Catalog commands over a backend product export.
//!
//! The export is the JSON array returned by the backend's `products` table.
//! Rows go through the same boundary mapping as the storefront, so rows it
//! would skip are skipped here too.
//!
//! # Usage
//!
//! ```bash
//! pw-cli catalog filter --products export.json --category Hoodies --sort price-asc
//! pw-cli catalog categories --products export.json
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use pixelwear_core::catalog::{self, FilterSpec, ProductView, SortKey};
use pixelwear_storefront::backend::conversions;
use rust_decimal::Decimal;
use thiserror::Error;

use super::print_json;

/// Errors that can occur during catalog commands.
#[derive(Debug, Error)]
pub enum CatalogCommandError {
    /// The export file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The export is not a JSON array.
    #[error("Invalid product export: {0}")]
    Parse(serde_json::Error),

    /// Output could not be rendered.
    #[error("Failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

/// Filter options given on the command line.
#[derive(Debug, Clone, Default)]
pub struct FilterArgs {
    pub category: Option<String>,
    pub search: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub sort: Option<SortKey>,
}

impl From<FilterArgs> for FilterSpec {
    fn from(args: FilterArgs) -> Self {
        let defaults = Self::default();
        Self {
            category: args.category,
            search: args.search.unwrap_or_default(),
            min_price: args.min_price.unwrap_or(defaults.min_price),
            max_price: args.max_price.unwrap_or(defaults.max_price),
            sort: args.sort.unwrap_or(defaults.sort),
        }
    }
}

/// Load and map a product export.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a JSON array.
pub fn load_products(path: &Path) -> Result<Vec<ProductView>, CatalogCommandError> {
    let raw = fs::read_to_string(path).map_err(|source| CatalogCommandError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let rows: Vec<serde_json::Value> =
        serde_json::from_str(&raw).map_err(CatalogCommandError::Parse)?;

    let total = rows.len();
    let products = conversions::convert_products(rows);
    tracing::info!(total, mapped = products.len(), "Product export loaded");

    Ok(products)
}

/// Print the filtered view of the export.
///
/// # Errors
///
/// Returns an error if the export cannot be loaded.
pub fn filter(products: &Path, args: FilterArgs) -> Result<(), CatalogCommandError> {
    let products = load_products(products)?;
    let spec = FilterSpec::from(args);
    print_json(&catalog::view(&products, &spec))?;
    Ok(())
}

/// Print the distinct categories of the export.
///
/// # Errors
///
/// Returns an error if the export cannot be loaded.
pub fn categories(products: &Path) -> Result<(), CatalogCommandError> {
    let products = load_products(products)?;
    print_json(&catalog::categories(&products))?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use super::*;

    const EXPORT: &str = r#"[
        {"id": 1, "name": "Alpha Tee", "price": 25, "category": "Shirts", "featured": true},
        {"id": 2, "name": "Beta Cap", "price": "15.50", "category": "Hats"},
        {"id": 3, "name": "Gamma Tee", "price": 10, "category": "Shirts"},
        {"id": 4, "name": "Broken", "price": "free"}
    ]"#;

    fn export_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(EXPORT.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_products_skips_unmappable_rows() {
        let file = export_file();
        let products = load_products(file.path()).unwrap();

        assert_eq!(products.len(), 3);
        assert_eq!(products[1].price, Decimal::new(1550, 2));
    }

    #[test]
    fn test_filter_args_into_spec() {
        let file = export_file();
        let products = load_products(file.path()).unwrap();

        let spec = FilterSpec::from(FilterArgs {
            category: Some("Shirts".to_string()),
            sort: Some(SortKey::PriceAsc),
            ..FilterArgs::default()
        });
        let names: Vec<_> = catalog::view(&products, &spec)
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, ["Gamma Tee", "Alpha Tee"]);
    }

    #[test]
    fn test_missing_export_is_read_error() {
        let err = load_products(Path::new("/nonexistent/export.json")).unwrap_err();
        assert!(matches!(err, CatalogCommandError::Read { .. }));
    }

    #[test]
    fn test_non_array_export_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"products": []}"#).unwrap();

        let err = load_products(file.path()).unwrap_err();
        assert!(matches!(err, CatalogCommandError::Parse(_)));
    }
}
