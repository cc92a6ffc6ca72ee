use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::{ABOUT_PRODUCT_BOILERPLATE, UNKNOWN};
use crate::types::CategoryPath;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

const TRUE_FLAGS: [&str; 4] = ["Y", "YES", "TRUE", "1"];

fn level_or_unknown(level: Option<&str>) -> String {
    match level.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => UNKNOWN.to_string(),
    }
}

/// Split a `"Main | Sub | Leaf"` category path into its first two levels.
pub fn split_category(raw: Option<&str>) -> CategoryPath {
    let value = raw.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return CategoryPath { main: UNKNOWN.to_string(), sub: UNKNOWN.to_string() };
    }

    let mut levels = value.split('|');
    CategoryPath {
        main: level_or_unknown(levels.next()),
        sub: level_or_unknown(levels.next()),
    }
}

/// Yes/no flags: Y, YES, TRUE and 1 in any case are true, everything else false
pub fn parse_flag(raw: Option<&str>) -> bool {
    raw.map(|v| v.trim().to_uppercase())
        .map(|v| TRUE_FLAGS.contains(&v.as_str()))
        .unwrap_or(false)
}

/// Trim surrounding quotes and collapse internal whitespace
pub fn clean_product_name(raw: Option<&str>) -> String {
    let Some(value) = raw else {
        return UNKNOWN.to_string();
    };
    let unquoted = value.trim().trim_matches('"').trim_matches('\'');
    let collapsed = WHITESPACE_RUN.replace_all(unquoted, " ");
    let collapsed = collapsed.trim();
    if collapsed.is_empty() {
        UNKNOWN.to_string()
    } else {
        collapsed.to_string()
    }
}

pub fn clean_brand(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(brand) if !matches!(brand, "" | "nan" | "None") => brand.to_string(),
        _ => UNKNOWN.to_string(),
    }
}

/// Remove the scraper boilerplate and the leading pipe separators it leaves behind
pub fn clean_about_product(raw: Option<&str>) -> String {
    let Some(value) = raw else {
        return String::new();
    };
    let without_boilerplate = value.trim().replace(ABOUT_PRODUCT_BOILERPLATE, "");
    without_boilerplate
        .trim()
        .trim_start_matches(|c| c == '|' || c == ' ')
        .trim()
        .to_string()
}

/// Count real image URLs in a pipe-separated list, ignoring tracking pixels
pub fn count_images(raw: Option<&str>) -> u32 {
    raw.map(|urls| {
        urls.split('|')
            .filter(|url| url.contains("http") && !url.contains("transparent-pixel"))
            .count() as u32
    })
    .unwrap_or(0)
}
