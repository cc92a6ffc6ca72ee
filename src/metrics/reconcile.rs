//! Reconcile phase metrics

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};
use crate::pipeline::processing::reconcile::ReconcileSummary;

pub struct ReconcileMetrics;

impl ReconcileMetrics {
    pub fn record(summary: &ReconcileSummary) {
        ::metrics::counter!(phase_metric!(counter, "reconcile", "price_swaps")).increment(summary.swapped as u64);
        ::metrics::counter!(phase_metric!(counter, "reconcile", "imputed_prices"), "price" => "selling")
            .increment(summary.imputed_selling as u64);
        ::metrics::counter!(phase_metric!(counter, "reconcile", "imputed_prices"), "price" => "list")
            .increment(summary.imputed_list as u64);
        if let Some(pct) = summary.mean_discount_pct {
            ::metrics::gauge!(phase_metric!(gauge, "reconcile", "mean_discount_pct")).set(pct);
        }
    }
}

impl PhaseMetrics for ReconcileMetrics {
    fn register_metrics() {
        use metrics::{counter, gauge};

        let _ = counter!(phase_metric!(counter, "reconcile", "price_swaps"));
        let _ = counter!(phase_metric!(counter, "reconcile", "imputed_prices"));
        let _ = gauge!(phase_metric!(gauge, "reconcile", "mean_discount_pct"));
    }

    fn phase_name() -> &'static str {
        "reconcile"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "reconcile", "price_swaps"),
                metric_type: MetricType::Counter,
                help: "Records whose selling price exceeded the list price and were swapped",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "reconcile", "imputed_prices"),
                metric_type: MetricType::Counter,
                help: "Prices filled in from the other price",
                labels: vec!["price"],
            },
            MetricDoc {
                name: phase_metric!(gauge, "reconcile", "mean_discount_pct"),
                metric_type: MetricType::Gauge,
                help: "Mean discount percentage of the last reconciled batch",
                labels: vec![],
            },
        ]
    }
}
