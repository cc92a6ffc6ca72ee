use serde::Serialize;

use crate::metrics::NormalizeMetrics;
use crate::types::{CleanProduct, RawProduct};

pub mod fields;

use fields::{
    clean_about_product, clean_brand, clean_product_name, count_images, parse_dimensions, parse_flag,
    parse_price, parse_quantity, parse_weight_oz, split_category,
};

/// Trait for turning raw catalog rows into typed products
pub trait Normalizer {
    /// Normalize a single raw record. Never fails: unreadable cells become `None`
    /// or their documented default.
    fn normalize(&self, raw: &RawProduct) -> CleanProduct;
}

/// Counts of cells that were present in the raw row but could not be parsed
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizationSummary {
    pub records: usize,
    pub unparsed_selling_price: usize,
    pub unparsed_list_price: usize,
    pub unparsed_quantity: usize,
    pub unparsed_weight: usize,
    pub unparsed_dimensions: usize,
}

/// Default normalizer for the product catalog export
#[derive(Debug, Clone, Default)]
pub struct ProductNormalizer;

impl ProductNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Normalize a whole batch, tracking cells that degraded to absent
    pub fn normalize_batch(&self, raws: &[RawProduct]) -> (Vec<CleanProduct>, NormalizationSummary) {
        let mut summary = NormalizationSummary::default();
        let mut products = Vec::with_capacity(raws.len());

        for raw in raws {
            let product = self.normalize(raw);

            if raw.selling_price.is_some() && product.selling_price.is_none() {
                summary.unparsed_selling_price += 1;
                NormalizeMetrics::record_unparsed("selling_price");
            }
            if raw.list_price.is_some() && product.list_price.is_none() {
                summary.unparsed_list_price += 1;
                NormalizeMetrics::record_unparsed("list_price");
            }
            if raw.quantity.is_some() && product.quantity.is_none() {
                summary.unparsed_quantity += 1;
                NormalizeMetrics::record_unparsed("quantity");
            }
            if raw.shipping_weight.is_some() && product.shipping_weight_oz.is_none() {
                summary.unparsed_weight += 1;
                NormalizeMetrics::record_unparsed("shipping_weight");
            }
            if raw.product_dimensions.is_some() && product.dim_length.is_none() {
                summary.unparsed_dimensions += 1;
                NormalizeMetrics::record_unparsed("product_dimensions");
            }

            products.push(product);
        }

        summary.records = products.len();
        NormalizeMetrics::record_batch(products.len());
        (products, summary)
    }
}

/// Normalize one raw row with the default field parsers
pub fn normalize_product(raw: &RawProduct) -> CleanProduct {
    ProductNormalizer::new().normalize(raw)
}

impl Normalizer for ProductNormalizer {
    fn normalize(&self, raw: &RawProduct) -> CleanProduct {
        let category = split_category(raw.category.as_deref());
        let dimensions = parse_dimensions(raw.product_dimensions.as_deref());

        CleanProduct {
            product_id: raw.product_id.clone(),
            product_name: clean_product_name(raw.product_name.as_deref()),
            brand: clean_brand(raw.brand.as_deref()),
            asin: raw.asin.clone(),
            main_category: category.main,
            sub_category: category.sub,
            category: raw.category.clone(),
            upc_ean_code: raw.upc_ean_code.clone(),
            list_price: parse_price(raw.list_price.as_deref()),
            selling_price: parse_price(raw.selling_price.as_deref()),
            // Filled in by the reconciler once both prices are settled
            discount_amount: None,
            discount_pct: None,
            quantity: parse_quantity(raw.quantity.as_deref()),
            model_number: raw.model_number.clone(),
            about_product: clean_about_product(raw.about_product.as_deref()),
            product_specification: raw.product_specification.clone(),
            technical_details: raw.technical_details.clone(),
            shipping_weight_oz: parse_weight_oz(raw.shipping_weight.as_deref()),
            dim_length: dimensions.length,
            dim_width: dimensions.width,
            dim_height: dimensions.height,
            image_urls: raw.image_urls.clone(),
            image_count: count_images(raw.image_urls.as_deref()),
            variants: raw.variants.clone(),
            sku: raw.sku.clone(),
            product_url: raw.product_url.clone(),
            stock: raw.stock.clone(),
            color: raw.color.clone(),
            is_amazon_seller: parse_flag(raw.is_amazon_seller.as_deref()),
            product_description: raw.product_description.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::UNKNOWN;
    use crate::types::Quantity;

    fn sample_raw() -> RawProduct {
        RawProduct {
            product_id: Some("p-1".to_string()),
            product_name: Some("  \"Wireless   Headphones\" ".to_string()),
            brand: Some("nan".to_string()),
            category: Some("Electronics | Audio | Headphones".to_string()),
            selling_price: Some("$19.26 - $35.63".to_string()),
            list_price: Some("$49.99".to_string()),
            quantity: Some("2".to_string()),
            shipping_weight: Some("1 pounds 6 ounces".to_string()),
            product_dimensions: Some("6 x 7 x 0.1 inches".to_string()),
            image_urls: Some("https://img/1.jpg|https://img/transparent-pixel.jpg".to_string()),
            is_amazon_seller: Some("Y".to_string()),
            ..RawProduct::default()
        }
    }

    #[test]
    fn test_normalize_full_record() {
        let product = ProductNormalizer::new().normalize(&sample_raw());

        assert_eq!(product.product_name, "Wireless Headphones");
        assert_eq!(product.brand, UNKNOWN);
        assert_eq!(product.main_category, "Electronics");
        assert_eq!(product.sub_category, "Audio");
        assert_eq!(product.selling_price, Some(19.26));
        assert_eq!(product.list_price, Some(49.99));
        assert_eq!(product.quantity, Some(Quantity::Whole(2)));
        assert_eq!(product.shipping_weight_oz, Some(22.0));
        assert_eq!(product.dim_height, Some(0.1));
        assert_eq!(product.image_count, 1);
        assert!(product.is_amazon_seller);
        assert_eq!(product.discount_pct, None);
    }

    #[test]
    fn test_empty_record_degrades_to_defaults() {
        let product = ProductNormalizer::new().normalize(&RawProduct::default());

        assert_eq!(product.product_name, UNKNOWN);
        assert_eq!(product.main_category, UNKNOWN);
        assert_eq!(product.sub_category, UNKNOWN);
        assert_eq!(product.about_product, "");
        assert_eq!(product.selling_price, None);
        assert_eq!(product.image_count, 0);
        assert!(!product.is_amazon_seller);
    }

    #[test]
    fn test_batch_counts_unparsed_cells() {
        let mut unreadable = sample_raw();
        unreadable.selling_price = Some("Call for price".to_string());
        unreadable.product_dimensions = Some("varies".to_string());

        let (products, summary) = ProductNormalizer::new().normalize_batch(&[sample_raw(), unreadable]);

        assert_eq!(products.len(), 2);
        assert_eq!(summary.records, 2);
        assert_eq!(summary.unparsed_selling_price, 1);
        assert_eq!(summary.unparsed_dimensions, 1);
        assert_eq!(summary.unparsed_list_price, 0);
    }
}
