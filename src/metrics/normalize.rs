//! Normalize phase metrics

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct NormalizeMetrics;

impl NormalizeMetrics {
    /// A raw cell was present but could not be parsed into its typed field
    pub fn record_unparsed(field: &'static str) {
        ::metrics::counter!(phase_metric!(counter, "normalize", "unparsed_cells"), "field" => field)
            .increment(1);
    }

    pub fn record_batch(records: usize) {
        ::metrics::counter!(phase_metric!(counter, "normalize", "records")).increment(records as u64);
        ::metrics::histogram!(phase_metric!(histogram, "normalize", "batch_size")).record(records as f64);
    }
}

impl PhaseMetrics for NormalizeMetrics {
    fn register_metrics() {
        use metrics::{counter, histogram};

        let _ = counter!(phase_metric!(counter, "normalize", "records"));
        let _ = counter!(phase_metric!(counter, "normalize", "unparsed_cells"));
        let _ = histogram!(phase_metric!(histogram, "normalize", "batch_size"));
    }

    fn phase_name() -> &'static str {
        "normalize"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "normalize", "records"),
                metric_type: MetricType::Counter,
                help: "Product rows normalized",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "normalize", "unparsed_cells"),
                metric_type: MetricType::Counter,
                help: "Present raw cells that did not parse into a typed value",
                labels: vec!["field"],
            },
            MetricDoc {
                name: phase_metric!(histogram, "normalize", "batch_size"),
                metric_type: MetricType::Histogram,
                help: "Rows per normalized batch",
                labels: vec![],
            },
        ]
    }
}
