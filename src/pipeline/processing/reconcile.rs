use serde::Serialize;
use tracing::{debug, info};

use crate::constants::{LIST_FROM_SELLING_RATIO, SELLING_FROM_LIST_RATIO};
use crate::metrics::ReconcileMetrics;
use crate::stats::round_to;
use crate::types::CleanProduct;

/// Ratios used to impute a missing price from the one that is present
#[derive(Debug, Clone)]
pub struct ReconcileConfig {
    /// selling = list × ratio when selling is absent
    pub selling_from_list: f64,
    /// list = selling × ratio when list is absent
    pub list_from_selling: f64,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            selling_from_list: SELLING_FROM_LIST_RATIO,
            list_from_selling: LIST_FROM_SELLING_RATIO,
        }
    }
}

/// What the reconciler changed across a batch
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconcileSummary {
    pub swapped: usize,
    pub imputed_selling: usize,
    pub imputed_list: usize,
    pub mean_discount_pct: Option<f64>,
}

/// Cross-field price consistency pass
pub struct Reconciler {
    pub config: ReconcileConfig,
}

/// Discount percentage off the list price, rounded to 2 decimals and never negative.
///
/// `None` when either price is missing or the list price is zero.
pub fn discount_pct(list: Option<f64>, selling: Option<f64>) -> Option<f64> {
    let (list, selling) = (list?, selling?);
    if list == 0.0 {
        return None;
    }
    let pct = round_to((list - selling) / list * 100.0, 2);
    Some(pct.max(0.0))
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new()
    }
}

impl Reconciler {
    pub fn new() -> Self {
        Self { config: ReconcileConfig::default() }
    }

    pub fn with_config(config: ReconcileConfig) -> Self {
        Self { config }
    }

    /// Reconcile one product in place. Returns (swapped, imputed_selling, imputed_list).
    pub fn reconcile_product(&self, product: &mut CleanProduct) -> (bool, bool, bool) {
        // Selling above list is a data-entry error, not a markup
        let swapped = match (product.selling_price, product.list_price) {
            (Some(selling), Some(list)) if selling > list => {
                product.selling_price = Some(list);
                product.list_price = Some(selling);
                true
            }
            _ => false,
        };

        let imputed_selling = match (product.selling_price, product.list_price) {
            (None, Some(list)) => {
                product.selling_price = Some(list * self.config.selling_from_list);
                true
            }
            _ => false,
        };

        let imputed_list = match (product.selling_price, product.list_price) {
            (Some(selling), None) => {
                product.list_price = Some(selling * self.config.list_from_selling);
                true
            }
            _ => false,
        };

        product.discount_amount = match (product.list_price, product.selling_price) {
            (Some(list), Some(selling)) => Some(list - selling),
            _ => None,
        };
        product.discount_pct = discount_pct(product.list_price, product.selling_price);

        (swapped, imputed_selling, imputed_list)
    }

    /// Reconcile a batch, consuming it and handing it back with a summary
    pub fn reconcile(&self, mut products: Vec<CleanProduct>) -> (Vec<CleanProduct>, ReconcileSummary) {
        let mut summary = ReconcileSummary::default();

        for product in products.iter_mut() {
            let (swapped, imputed_selling, imputed_list) = self.reconcile_product(product);
            summary.swapped += swapped as usize;
            summary.imputed_selling += imputed_selling as usize;
            summary.imputed_list += imputed_list as usize;
        }

        let discounts: Vec<f64> = products.iter().filter_map(|p| p.discount_pct).collect();
        if !discounts.is_empty() {
            summary.mean_discount_pct = Some(discounts.iter().sum::<f64>() / discounts.len() as f64);
        }

        debug!(?summary, "Reconciliation finished");
        info!(
            "Prices reconciled: {} swapped, {} selling imputed, {} list imputed",
            summary.swapped, summary.imputed_selling, summary.imputed_list
        );
        ReconcileMetrics::record(&summary);

        (products, summary)
    }
}
