/// Default file locations and fixed knobs shared across stages.

// Configuration
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
pub const CONFIG_ENV_VAR: &str = "CATALOG_ANALYTICS_CONFIG";

// Default data locations
pub const DEFAULT_PRODUCTS_PATH: &str = "data/product_details.csv";
pub const DEFAULT_CLEANED_PRODUCTS_PATH: &str = "data/cleaned_product_details.csv";
pub const DEFAULT_EVENTS_PATH: &str = "data/E-commerece sales data 2024.csv";
pub const DEFAULT_CONTENT_PATH: &str = "data/netflix_titles.csv";

// Output file names
pub const WEEKLY_DASHBOARD_FILE: &str = "weekly_sales_analysis.svg";
pub const BASIC_STATISTICS_FILE: &str = "basic_statistics.csv";
pub const HISTOGRAMS_FILE: &str = "histograms.svg";
pub const BOXPLOTS_FILE: &str = "boxplots.svg";
pub const SCATTERPLOTS_FILE: &str = "scatterplots.svg";
pub const CORRELATION_HEATMAP_FILE: &str = "correlation_heatmap.svg";
pub const CONTENT_OVERVIEW_FILE: &str = "content_overview.svg";
pub const METRICS_SNAPSHOT_FILE: &str = "metrics.prom";
pub const RUN_SUMMARY_FILE: &str = "run_summary.json";

/// Fallback label for missing category levels, brands and product names
pub const UNKNOWN: &str = "Unknown";

/// Boilerplate sentence the catalog scraper appended to "About Product"
pub const ABOUT_PRODUCT_BOILERPLATE: &str = "Make sure this fits by entering your model number.";

// Price reconciliation
pub const SELLING_FROM_LIST_RATIO: f64 = 0.85;
pub const LIST_FROM_SELLING_RATIO: f64 = 1.15;

// Weekly report
pub const WEEKLY_TOP_N: usize = 5;
pub const OVERALL_TOP_CATEGORIES: usize = 8;
pub const PIE_LABEL_MAX_CHARS: usize = 30;

// Exploratory analysis
pub const STAT_DECIMALS: i32 = 2;
pub const TOP_CORRELATIONS: usize = 5;
pub const MAX_SCATTER_PLOTS: usize = 3;
pub const SCATTER_MIN_ABS_CORRELATION: f64 = 0.1;
pub const HISTOGRAM_BINS: usize = 30;

/// Columns of the cleaned product table, in output order
pub const CLEANED_PRODUCT_COLUMNS: [&str; 30] = [
    "product_id",
    "product_name",
    "brand",
    "asin",
    "main_category",
    "sub_category",
    "category",
    "upc_ean_code",
    "list_price",
    "selling_price",
    "discount_amount",
    "discount_pct",
    "quantity",
    "model_number",
    "about_product",
    "product_specification",
    "technical_details",
    "shipping_weight_oz",
    "dim_length",
    "dim_width",
    "dim_height",
    "image_urls",
    "image_count",
    "variants",
    "sku",
    "product_url",
    "stock",
    "color",
    "is_amazon_seller",
    "product_description",
];

/// Numeric columns summarized by the cleaning stage's describe table
pub const DESCRIBED_PRODUCT_COLUMNS: [&str; 6] = [
    "selling_price",
    "list_price",
    "quantity",
    "shipping_weight_oz",
    "discount_pct",
    "image_count",
];
