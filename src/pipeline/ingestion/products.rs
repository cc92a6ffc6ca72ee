use csv::ReaderBuilder;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, instrument, warn};

use super::require_file;
use crate::error::Result;
use crate::pipeline::processing::normalize::fields::{parse_price, split_category};
use crate::types::RawProduct;

/// Outcome of duplicate removal
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize)]
pub struct DedupSummary {
    pub exact_duplicates: usize,
    pub id_duplicates: usize,
}

/// Load the raw product catalog.
///
/// Short rows load with the missing trailing cells absent. A row that cannot
/// be decoded at all (invalid UTF-8, for one) fails the load, so the
/// row count reported downstream always matches the file.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_products(path: &Path) -> Result<Vec<RawProduct>> {
    require_file(path)?;
    let mut reader = ReaderBuilder::new().flexible(true).from_path(path)?;

    let mut products = Vec::new();
    for result in reader.deserialize::<RawProduct>() {
        products.push(result?);
    }

    info!("Loaded {} product rows", products.len());
    Ok(products)
}

/// Drop exact duplicate rows, then later rows repeating a product id.
///
/// The first occurrence wins in both passes. A missing id is treated as a
/// value of its own, so only the first id-less row survives.
pub fn deduplicate(products: Vec<RawProduct>) -> (Vec<RawProduct>, DedupSummary) {
    let mut summary = DedupSummary::default();

    let mut seen_rows = HashSet::new();
    let mut unique_rows = Vec::with_capacity(products.len());
    for product in products {
        if seen_rows.insert(product.clone()) {
            unique_rows.push(product);
        } else {
            summary.exact_duplicates += 1;
        }
    }

    let mut seen_ids = HashSet::new();
    let mut unique_ids = Vec::with_capacity(unique_rows.len());
    for product in unique_rows {
        if seen_ids.insert(product.product_id.clone()) {
            unique_ids.push(product);
        } else {
            summary.id_duplicates += 1;
        }
    }

    (unique_ids, summary)
}

/// The product attributes the weekly report joins onto interaction events.
///
/// Accepts the cleaned catalog as well as the raw export headers.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CatalogEntry {
    #[serde(alias = "Uniqe Id", alias = "Unique Id")]
    pub product_id: Option<String>,
    #[serde(alias = "Product Name")]
    pub product_name: Option<String>,
    #[serde(alias = "Category")]
    pub category: Option<String>,
    #[serde(alias = "Selling Price", deserialize_with = "price_cell")]
    pub selling_price: Option<f64>,
    #[serde(alias = "List Price", deserialize_with = "price_cell")]
    pub list_price: Option<f64>,
}

impl CatalogEntry {
    pub fn main_category(&self) -> String {
        split_category(self.category.as_deref()).main
    }
}

fn price_cell<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(parse_price(raw.as_deref()))
}

/// Load the product catalog used for the event join
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_catalog(path: &Path) -> Result<Vec<CatalogEntry>> {
    require_file(path)?;
    let mut reader = ReaderBuilder::new().flexible(true).from_path(path)?;

    let mut entries = Vec::new();
    for result in reader.deserialize::<CatalogEntry>() {
        match result {
            Ok(entry) => entries.push(entry),
            Err(e) => warn!("Skipping undecodable catalog row: {}", e),
        }
    }
    info!("Loaded {} catalog entries", entries.len());
    Ok(entries)
}
