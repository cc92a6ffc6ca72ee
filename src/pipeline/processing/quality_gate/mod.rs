use serde::Serialize;
use std::collections::BTreeMap;

use crate::constants::{CLEANED_PRODUCT_COLUMNS, DESCRIBED_PRODUCT_COLUMNS};
use crate::stats::{self, round_to, IqrFences};
use crate::types::{CleanProduct, RawProduct};

/// Quality checkpoint over the reconciled catalog: missing data, summary
/// statistics and price outliers
#[derive(Debug, Clone, Serialize)]
pub struct QualityReport {
    pub rows: usize,
    pub missing: Vec<MissingValues>,
    /// Loaded raw columns that the cleaned catalog does not carry
    pub raw_missing: Vec<MissingValues>,
    pub describe: Vec<ColumnDescription>,
    pub outliers: Vec<OutlierCheck>,
    pub top_main_categories: Vec<CategoryCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

/// Absent values in one column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingValues {
    pub column: &'static str,
    pub missing: usize,
    /// Share of rows, rounded to one decimal
    pub percent: f64,
}

/// Describe-style summary of a numeric column, rounded to 2 decimals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDescription {
    pub column: &'static str,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

/// IQR outlier check for one price column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierCheck {
    pub column: &'static str,
    pub fences: IqrFencesView,
    pub outliers: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IqrFencesView {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower: f64,
    pub upper: f64,
}

impl From<IqrFences> for IqrFencesView {
    fn from(f: IqrFences) -> Self {
        Self { q1: f.q1, q3: f.q3, iqr: f.iqr, lower: f.lower, upper: f.upper }
    }
}

/// Main categories shown in the distribution table
const TOP_MAIN_CATEGORIES: usize = 10;

/// Price columns checked for outliers
const OUTLIER_COLUMNS: [&str; 2] = ["selling_price", "list_price"];

/// Raw columns parsed into other fields or dropped from the output
const RAW_ONLY_COLUMNS: [&str; 7] = [
    "shipping_weight",
    "product_dimensions",
    "product_details",
    "dimensions",
    "ingredients",
    "direction_to_use",
    "size_quantity_variant",
];

fn raw_only_cell<'a>(product: &'a RawProduct, column: &str) -> Option<&'a str> {
    match column {
        "shipping_weight" => product.shipping_weight.as_deref(),
        "product_dimensions" => product.product_dimensions.as_deref(),
        "product_details" => product.product_details.as_deref(),
        "dimensions" => product.dimensions.as_deref(),
        "ingredients" => product.ingredients.as_deref(),
        "direction_to_use" => product.direction_to_use.as_deref(),
        "size_quantity_variant" => product.size_quantity_variant.as_deref(),
        _ => None,
    }
}

fn sorted_missing(mut missing: Vec<MissingValues>) -> Vec<MissingValues> {
    missing.retain(|m| m.missing > 0);
    // Stable sort keeps column order among equal percentages
    missing.sort_by(|a, b| b.percent.total_cmp(&a.percent));
    missing
}

fn column_values(products: &[CleanProduct], column: &str) -> Vec<f64> {
    products.iter().filter_map(|p| p.numeric(column)).collect()
}

/// Missing counts per output column, worst first; complete columns are left out
pub fn missing_values(products: &[CleanProduct]) -> Vec<MissingValues> {
    if products.is_empty() {
        return Vec::new();
    }
    let rows = products.len() as f64;
    sorted_missing(
        CLEANED_PRODUCT_COLUMNS
            .iter()
            .map(|&column| {
                let count = products.iter().filter(|p| p.is_absent(column)).count();
                MissingValues { column, missing: count, percent: round_to(count as f64 / rows * 100.0, 1) }
            })
            .collect(),
    )
}

/// Missing counts for the loaded raw columns that are not written out
pub fn raw_missing_values(raw: &[RawProduct]) -> Vec<MissingValues> {
    if raw.is_empty() {
        return Vec::new();
    }
    let rows = raw.len() as f64;
    sorted_missing(
        RAW_ONLY_COLUMNS
            .iter()
            .map(|&column| {
                let count = raw.iter().filter(|p| raw_only_cell(p, column).is_none()).count();
                MissingValues { column, missing: count, percent: round_to(count as f64 / rows * 100.0, 1) }
            })
            .collect(),
    )
}

pub fn describe_column(column: &'static str, values: &[f64]) -> ColumnDescription {
    let sorted = stats::sorted(values);
    let rounded = |v: Option<f64>| v.map(|x| round_to(x, 2));
    ColumnDescription {
        column,
        count: sorted.len(),
        mean: rounded(stats::mean(&sorted)),
        std: rounded(stats::std_dev(&sorted)),
        min: rounded(sorted.first().copied()),
        q25: rounded(stats::quantile_sorted(&sorted, 0.25)),
        median: rounded(stats::quantile_sorted(&sorted, 0.5)),
        q75: rounded(stats::quantile_sorted(&sorted, 0.75)),
        max: rounded(sorted.last().copied()),
    }
}

pub fn outlier_check(column: &'static str, values: &[f64]) -> Option<OutlierCheck> {
    let fences = IqrFences::from_values(values)?;
    Some(OutlierCheck { column, outliers: fences.count_outliers(values), fences: fences.into() })
}

/// Most frequent main categories; equal counts in name order
pub fn main_category_distribution(products: &[CleanProduct], n: usize) -> Vec<CategoryCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for product in products {
        *counts.entry(product.main_category.as_str()).or_insert(0) += 1;
    }
    let mut distribution: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(category, count)| CategoryCount { category: category.to_string(), count })
        .collect();
    distribution.sort_by(|a, b| b.count.cmp(&a.count));
    distribution.truncate(n);
    distribution
}

impl QualityReport {
    /// Assess the reconciled catalog; `raw` is the de-duplicated input it came from
    pub fn assess(products: &[CleanProduct], raw: &[RawProduct]) -> Self {
        let describe = DESCRIBED_PRODUCT_COLUMNS
            .iter()
            .map(|&column| describe_column(column, &column_values(products, column)))
            .collect();

        let outliers = OUTLIER_COLUMNS
            .iter()
            .filter_map(|&column| outlier_check(column, &column_values(products, column)))
            .collect();

        Self {
            rows: products.len(),
            missing: missing_values(products),
            raw_missing: raw_missing_values(raw),
            describe,
            outliers,
            top_main_categories: main_category_distribution(products, TOP_MAIN_CATEGORIES),
        }
    }
}
