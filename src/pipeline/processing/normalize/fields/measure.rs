use once_cell::sync::Lazy;
use regex::Regex;

use super::price::is_missing_token;
use crate::types::Dimensions;

const OUNCES_PER_POUND: f64 = 16.0;

static PARENTHETICAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(.*?\)").expect("parenthetical regex"));
static POUNDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d[\d,.]*)\s*(pounds?|lbs?)").expect("pounds regex"));
static OUNCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d[\d,.]*)\s*(ounces?|oz)").expect("ounces regex"));
static NON_NUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9.]").expect("non-numeric regex"));
static THREE_FACTORS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)([\d.]+)\s*x\s*([\d.]+)\s*x\s*([\d.]+)").expect("three factor regex")
});
static TWO_FACTORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)([\d.]+)\s*x\s*([\d.]+)").expect("two factor regex"));

fn unit_amount(regex: &Regex, text: &str) -> Option<f64> {
    let captures = regex.captures(text)?;
    let number = captures.get(1)?.as_str().replace(',', "");
    if number == "." {
        return None;
    }
    number.parse::<f64>().ok()
}

/// Convert a shipping weight cell to ounces.
///
/// Pound and ounce amounts add up when both appear ("1 pounds 6 ounces" is
/// 22 oz). A bare number without any unit is read as pounds. Zero or
/// unreadable weights are `None`.
pub fn parse_weight_oz(raw: Option<&str>) -> Option<f64> {
    let lowered = raw?.trim().to_lowercase();
    if is_missing_token(&lowered) {
        return None;
    }
    let value = PARENTHETICAL.replace_all(&lowered, "");
    let value = value.trim();

    let has_unit = POUNDS.is_match(value) || OUNCES.is_match(value);
    let ounces = if has_unit {
        let pounds = unit_amount(&POUNDS, value).unwrap_or(0.0);
        let ounces = unit_amount(&OUNCES, value).unwrap_or(0.0);
        pounds * OUNCES_PER_POUND + ounces
    } else {
        let digits = NON_NUMERIC.replace_all(value, "");
        if digits.is_empty() || digits == "." {
            return None;
        }
        digits.parse::<f64>().ok()? * OUNCES_PER_POUND
    };

    (ounces > 0.0 && ounces.is_finite()).then_some(ounces)
}

fn factor(captures: &regex::Captures<'_>, index: usize) -> Option<f64> {
    captures.get(index)?.as_str().parse::<f64>().ok()
}

/// Read "L x W x H" (or "L x W") out of a dimensions cell.
///
/// A pattern that matches but holds an unreadable factor such as ".." yields
/// no dimensions at all rather than a partial triple.
pub fn parse_dimensions(raw: Option<&str>) -> Dimensions {
    let Some(value) = raw.map(str::trim) else {
        return Dimensions::default();
    };

    if let Some(captures) = THREE_FACTORS.captures(value) {
        return match (factor(&captures, 1), factor(&captures, 2), factor(&captures, 3)) {
            (Some(length), Some(width), Some(height)) => Dimensions {
                length: Some(length),
                width: Some(width),
                height: Some(height),
            },
            _ => Dimensions::default(),
        };
    }

    if let Some(captures) = TWO_FACTORS.captures(value) {
        return match (factor(&captures, 1), factor(&captures, 2)) {
            (Some(length), Some(width)) => Dimensions {
                length: Some(length),
                width: Some(width),
                height: None,
            },
            _ => Dimensions::default(),
        };
    }

    Dimensions::default()
}
