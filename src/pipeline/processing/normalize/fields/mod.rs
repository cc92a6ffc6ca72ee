// Field-level parsers: pure functions that never fail, absence is `None`
pub mod measure;
pub mod price;
pub mod text;

pub use measure::{parse_dimensions, parse_weight_oz};
pub use price::{parse_price, parse_quantity};
pub use text::{clean_about_product, clean_brand, clean_product_name, count_images, parse_flag, split_category};
