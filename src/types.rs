use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// One row of the raw product catalog.
///
/// Raw headers ("Uniqe Id", "Selling Price", ...) are accepted as aliases of
/// the canonical snake_case names, so both the scraped export and an already
/// renamed file load into the same shape. Every field is optional because
/// the export leaves cells blank freely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(default)]
pub struct RawProduct {
    #[serde(alias = "Uniqe Id", alias = "Unique Id")]
    pub product_id: Option<String>,
    #[serde(alias = "Product Name")]
    pub product_name: Option<String>,
    #[serde(alias = "Brand Name")]
    pub brand: Option<String>,
    #[serde(alias = "Asin")]
    pub asin: Option<String>,
    #[serde(alias = "Category")]
    pub category: Option<String>,
    #[serde(alias = "Upc Ean Code")]
    pub upc_ean_code: Option<String>,
    #[serde(alias = "List Price")]
    pub list_price: Option<String>,
    #[serde(alias = "Selling Price")]
    pub selling_price: Option<String>,
    #[serde(alias = "Quantity")]
    pub quantity: Option<String>,
    #[serde(alias = "Model Number")]
    pub model_number: Option<String>,
    #[serde(alias = "About Product")]
    pub about_product: Option<String>,
    #[serde(alias = "Product Specification")]
    pub product_specification: Option<String>,
    #[serde(alias = "Technical Details")]
    pub technical_details: Option<String>,
    #[serde(alias = "Shipping Weight")]
    pub shipping_weight: Option<String>,
    #[serde(alias = "Product Dimensions")]
    pub product_dimensions: Option<String>,
    #[serde(alias = "Image")]
    pub image_urls: Option<String>,
    #[serde(alias = "Variants")]
    pub variants: Option<String>,
    #[serde(alias = "Sku")]
    pub sku: Option<String>,
    #[serde(alias = "Product Url")]
    pub product_url: Option<String>,
    #[serde(alias = "Stock")]
    pub stock: Option<String>,
    #[serde(alias = "Product Details")]
    pub product_details: Option<String>,
    #[serde(alias = "Dimensions")]
    pub dimensions: Option<String>,
    #[serde(alias = "Color")]
    pub color: Option<String>,
    #[serde(alias = "Ingredients")]
    pub ingredients: Option<String>,
    #[serde(alias = "Direction To Use")]
    pub direction_to_use: Option<String>,
    #[serde(alias = "Is Amazon Seller")]
    pub is_amazon_seller: Option<String>,
    #[serde(alias = "Size Quantity Variant")]
    pub size_quantity_variant: Option<String>,
    #[serde(alias = "Product Description")]
    pub product_description: Option<String>,
}

/// Parsed quantity: whole numbers stay integral, anything else keeps its fraction
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Quantity {
    Whole(i64),
    Fractional(f64),
}

impl Quantity {
    pub fn as_f64(&self) -> f64 {
        match self {
            Quantity::Whole(n) => *n as f64,
            Quantity::Fractional(x) => *x,
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantity::Whole(n) => write!(f, "{}", n),
            Quantity::Fractional(x) => write!(f, "{}", x),
        }
    }
}

/// Package dimensions in inches
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Dimensions {
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

/// First two levels of a pipe-delimited category path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryPath {
    pub main: String,
    pub sub: String,
}

/// A product after field normalization and price reconciliation.
///
/// Field order is the column order of the cleaned CSV.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanProduct {
    pub product_id: Option<String>,
    pub product_name: String,
    pub brand: String,
    pub asin: Option<String>,
    pub main_category: String,
    pub sub_category: String,
    pub category: Option<String>,
    pub upc_ean_code: Option<String>,
    pub list_price: Option<f64>,
    pub selling_price: Option<f64>,
    pub discount_amount: Option<f64>,
    pub discount_pct: Option<f64>,
    pub quantity: Option<Quantity>,
    pub model_number: Option<String>,
    pub about_product: String,
    pub product_specification: Option<String>,
    pub technical_details: Option<String>,
    pub shipping_weight_oz: Option<f64>,
    pub dim_length: Option<f64>,
    pub dim_width: Option<f64>,
    pub dim_height: Option<f64>,
    pub image_urls: Option<String>,
    pub image_count: u32,
    pub variants: Option<String>,
    pub sku: Option<String>,
    pub product_url: Option<String>,
    pub stock: Option<String>,
    pub color: Option<String>,
    #[serde(serialize_with = "serialize_flag")]
    pub is_amazon_seller: bool,
    pub product_description: Option<String>,
}

impl CleanProduct {
    /// Value of a numeric output column by name, for the describe and outlier reports
    pub fn numeric(&self, column: &str) -> Option<f64> {
        match column {
            "list_price" => self.list_price,
            "selling_price" => self.selling_price,
            "discount_amount" => self.discount_amount,
            "discount_pct" => self.discount_pct,
            "quantity" => self.quantity.map(|q| q.as_f64()),
            "shipping_weight_oz" => self.shipping_weight_oz,
            "dim_length" => self.dim_length,
            "dim_width" => self.dim_width,
            "dim_height" => self.dim_height,
            "image_count" => Some(self.image_count as f64),
            _ => None,
        }
    }

    /// Whether an output column holds no value for this record
    pub fn is_absent(&self, column: &str) -> bool {
        match column {
            "product_id" => self.product_id.is_none(),
            "asin" => self.asin.is_none(),
            "category" => self.category.is_none(),
            "upc_ean_code" => self.upc_ean_code.is_none(),
            "model_number" => self.model_number.is_none(),
            "product_specification" => self.product_specification.is_none(),
            "technical_details" => self.technical_details.is_none(),
            "image_urls" => self.image_urls.is_none(),
            "variants" => self.variants.is_none(),
            "sku" => self.sku.is_none(),
            "product_url" => self.product_url.is_none(),
            "stock" => self.stock.is_none(),
            "color" => self.color.is_none(),
            "product_description" => self.product_description.is_none(),
            "product_name" | "brand" | "main_category" | "sub_category" | "about_product"
            | "image_count" | "is_amazon_seller" => false,
            other => self.numeric(other).is_none(),
        }
    }
}

fn serialize_flag<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(if *value { "True" } else { "False" })
}

/// Kind of user interaction recorded in the event log
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InteractionKind {
    View,
    Like,
    Purchase,
    Other(String),
}

impl InteractionKind {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "view" => InteractionKind::View,
            "like" => InteractionKind::Like,
            "purchase" => InteractionKind::Purchase,
            other => InteractionKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            InteractionKind::View => "view",
            InteractionKind::Like => "like",
            InteractionKind::Purchase => "purchase",
            InteractionKind::Other(name) => name,
        }
    }
}

/// One row of the interaction log, after timestamp parsing
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionEvent {
    pub user_id: Option<String>,
    pub product_id: Option<String>,
    pub kind: InteractionKind,
    pub timestamp: NaiveDateTime,
}

impl InteractionEvent {
    pub fn week(&self) -> WeekBucket {
        WeekBucket::from_date(self.timestamp.date())
    }
}

/// ISO-8601 (year, week) aggregation key.
///
/// The year is the ISO week-numbering year, so 2024-12-30 lands in 2025-W01
/// rather than being merged into a calendar-year bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WeekBucket {
    pub year: i32,
    pub week: u32,
}

impl WeekBucket {
    pub fn from_date(date: NaiveDate) -> Self {
        let iso = date.iso_week();
        Self { year: iso.year(), week: iso.week() }
    }

    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl Serialize for WeekBucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl fmt::Display for WeekBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-W{:02}", self.year, self.week)
    }
}
