// Pipeline storage: writing stage outputs to disk

use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::Result;
use crate::types::CleanProduct;

/// Create the parent directory of `path` if it has one
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Write serializable rows as CSV with a header row
pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    ensure_parent_dir(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the cleaned catalog in its fixed column order
pub fn write_clean_products(path: &Path, products: &[CleanProduct]) -> Result<()> {
    write_csv(path, products)?;
    info!("Wrote {} cleaned products to {}", products.len(), path.display());
    Ok(())
}

/// Write a value as pretty-printed JSON
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent_dir(path)?;
    let body = serde_json::to_string_pretty(value)?;
    fs::write(path, body)?;
    Ok(())
}
