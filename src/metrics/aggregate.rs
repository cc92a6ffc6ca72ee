//! Aggregate phase metrics (event loading and weekly rollups)

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};
use crate::pipeline::ingestion::InteractionLoadSummary;

pub struct AggregateMetrics;

impl AggregateMetrics {
    pub fn record_events_loaded(summary: &InteractionLoadSummary) {
        ::metrics::counter!(phase_metric!(counter, "aggregate", "events_loaded")).increment(summary.loaded as u64);
        ::metrics::counter!(phase_metric!(counter, "aggregate", "events_dropped"), "reason" => "missing_interaction_type")
            .increment(summary.missing_interaction_type as u64);
        ::metrics::counter!(phase_metric!(counter, "aggregate", "events_dropped"), "reason" => "unparseable_timestamp")
            .increment(summary.unparseable_timestamp as u64);
    }

    pub fn record_report(weeks: usize, purchases: usize) {
        ::metrics::gauge!(phase_metric!(gauge, "aggregate", "weeks")).set(weeks as f64);
        ::metrics::counter!(phase_metric!(counter, "aggregate", "purchases")).increment(purchases as u64);
    }
}

impl PhaseMetrics for AggregateMetrics {
    fn register_metrics() {
        use metrics::{counter, gauge};

        let _ = counter!(phase_metric!(counter, "aggregate", "events_loaded"));
        let _ = counter!(phase_metric!(counter, "aggregate", "events_dropped"));
        let _ = counter!(phase_metric!(counter, "aggregate", "purchases"));
        let _ = gauge!(phase_metric!(gauge, "aggregate", "weeks"));
    }

    fn phase_name() -> &'static str {
        "aggregate"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "aggregate", "events_loaded"),
                metric_type: MetricType::Counter,
                help: "Interaction events kept after loading",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "aggregate", "events_dropped"),
                metric_type: MetricType::Counter,
                help: "Interaction rows dropped while loading",
                labels: vec!["reason"],
            },
            MetricDoc {
                name: phase_metric!(counter, "aggregate", "purchases"),
                metric_type: MetricType::Counter,
                help: "Purchase events aggregated",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(gauge, "aggregate", "weeks"),
                metric_type: MetricType::Gauge,
                help: "Distinct weeks in the last weekly report",
                labels: vec![],
            },
        ]
    }
}
