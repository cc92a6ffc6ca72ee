use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::Quantity;

static PRICE_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$?\s*([\d,.]+)\s*-\s*\$?\s*([\d,.]+)").expect("price range regex")
});
static FIRST_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+\.?\d*)").expect("first number regex"));

const CURRENCY_SYMBOLS: [char; 3] = ['$', '€', '£'];

/// Tokens the catalog export uses for "no value"
pub(crate) fn is_missing_token(value: &str) -> bool {
    value.is_empty() || value == "." || value.eq_ignore_ascii_case("nan") || value.eq_ignore_ascii_case("none")
}

/// Parse a finite number after thousands separators are removed
fn parse_amount(text: &str) -> Option<f64> {
    let cleaned = text.replace(',', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() || cleaned == "." {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a price cell such as `"$1,299.00"` or `"$19.26 - $35.63"`.
///
/// Ranges resolve to their lower bound. Missing tokens and anything that is
/// not a plain amount once symbols and separators are removed come back as
/// `None`.
pub fn parse_price(raw: Option<&str>) -> Option<f64> {
    let value = raw?.trim();
    if is_missing_token(value) {
        return None;
    }

    if let Some(captures) = PRICE_RANGE.captures(value) {
        let low = parse_amount(captures.get(1)?.as_str());
        let high = parse_amount(captures.get(2)?.as_str());
        return match (low, high) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (Some(a), None) | (None, Some(a)) => Some(a),
            (None, None) => None,
        };
    }

    let stripped: String = value.chars().filter(|c| !CURRENCY_SYMBOLS.contains(c)).collect();
    parse_amount(&stripped)
}

/// Extract the first number in a quantity cell.
pub fn parse_quantity(raw: Option<&str>) -> Option<Quantity> {
    let value = raw?.trim().replace(',', "");
    if is_missing_token(&value) {
        return None;
    }

    let captures = FIRST_NUMBER.captures(&value)?;
    let number: f64 = captures.get(1)?.as_str().parse().ok()?;
    if number.fract() == 0.0 && number <= i64::MAX as f64 {
        Some(Quantity::Whole(number as i64))
    } else {
        Some(Quantity::Fractional(number))
    }
}
