//! Analysis phase metrics

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct AnalysisMetrics;

impl AnalysisMetrics {
    pub fn record_dataset(rows: usize, numeric_columns: usize, categorical_columns: usize) {
        ::metrics::gauge!(phase_metric!(gauge, "analysis", "rows")).set(rows as f64);
        ::metrics::gauge!(phase_metric!(gauge, "analysis", "columns"), "kind" => "numeric").set(numeric_columns as f64);
        ::metrics::gauge!(phase_metric!(gauge, "analysis", "columns"), "kind" => "categorical")
            .set(categorical_columns as f64);
    }

    pub fn record_correlation_pairs(pairs: usize) {
        ::metrics::counter!(phase_metric!(counter, "analysis", "correlation_pairs")).increment(pairs as u64);
    }

    pub fn record_chart_written() {
        ::metrics::counter!(phase_metric!(counter, "analysis", "charts_written")).increment(1);
    }
}

impl PhaseMetrics for AnalysisMetrics {
    fn register_metrics() {
        use metrics::{counter, gauge};

        let _ = gauge!(phase_metric!(gauge, "analysis", "rows"));
        let _ = gauge!(phase_metric!(gauge, "analysis", "columns"));
        let _ = counter!(phase_metric!(counter, "analysis", "correlation_pairs"));
        let _ = counter!(phase_metric!(counter, "analysis", "charts_written"));
    }

    fn phase_name() -> &'static str {
        "analysis"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(gauge, "analysis", "rows"),
                metric_type: MetricType::Gauge,
                help: "Rows in the analyzed dataset",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(gauge, "analysis", "columns"),
                metric_type: MetricType::Gauge,
                help: "Columns in the analyzed dataset by inferred type",
                labels: vec!["kind"],
            },
            MetricDoc {
                name: phase_metric!(counter, "analysis", "correlation_pairs"),
                metric_type: MetricType::Counter,
                help: "Column pairs with a defined correlation coefficient",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "analysis", "charts_written"),
                metric_type: MetricType::Counter,
                help: "SVG charts written by any stage",
                labels: vec![],
            },
        ]
    }
}
