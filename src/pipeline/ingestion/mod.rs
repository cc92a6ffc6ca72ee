// Pipeline ingestion: reading the delimited source files into records

pub mod interactions;
pub mod products;

pub use interactions::{load_interactions, parse_timestamp, InteractionLoadSummary};
pub use products::{deduplicate, load_catalog, load_products, CatalogEntry, DedupSummary};

use std::path::Path;

use crate::error::{AnalyticsError, Result};

/// Fail early with a clear diagnostic when an input file is missing
pub(crate) fn require_file(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(AnalyticsError::MissingInput(path.display().to_string()))
    }
}
