//! Registration of every phase's metrics with conflict detection

use crate::metrics::{MetricDoc, PhaseMetrics};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Register all phases and warn about metric names defined twice
pub fn register_all_metrics() -> usize {
    let mut all_metrics = HashMap::new();

    register_phase_metrics::<super::normalize::NormalizeMetrics>(&mut all_metrics);
    register_phase_metrics::<super::reconcile::ReconcileMetrics>(&mut all_metrics);
    register_phase_metrics::<super::aggregate::AggregateMetrics>(&mut all_metrics);
    register_phase_metrics::<super::analysis::AnalysisMetrics>(&mut all_metrics);

    for line in summary_lines(&all_metrics) {
        debug!("{}", line);
    }
    debug!("Registered {} metrics across all phases", all_metrics.len());
    all_metrics.len()
}

fn register_phase_metrics<T: PhaseMetrics>(all_metrics: &mut HashMap<&'static str, MetricDoc>) {
    T::register_metrics();
    let phase_name = T::phase_name();

    for doc in T::metrics_documentation() {
        if let Some(existing) = all_metrics.get(doc.name) {
            warn!(
                "Metric name conflict: '{}' ({}) redefined by phase '{}'",
                doc.name, existing.help, phase_name
            );
        } else {
            all_metrics.insert(doc.name, doc);
        }
    }
}

/// Registry listing grouped by phase, one line per metric
fn summary_lines(all_metrics: &HashMap<&'static str, MetricDoc>) -> Vec<String> {
    let mut by_phase: BTreeMap<&str, Vec<&MetricDoc>> = BTreeMap::new();
    for doc in all_metrics.values() {
        by_phase.entry(phase_of(doc.name)).or_default().push(doc);
    }

    let mut lines = Vec::new();
    for (phase, mut docs) in by_phase {
        docs.sort_by_key(|d| d.name);
        lines.push(format!("Phase '{}': {} metrics", phase, docs.len()));
        for doc in docs {
            let labels = if doc.labels.is_empty() { String::new() } else { format!(" [{}]", doc.labels.join(", ")) };
            lines.push(format!("  - {} ({:?}){}: {}", doc.name, doc.metric_type, labels, doc.help));
        }
    }
    lines
}

/// Phase segment of a metric name, e.g. `catalog_reconcile_price_swaps_total` -> `reconcile`
pub fn phase_of(metric_name: &str) -> &str {
    metric_name
        .strip_prefix("catalog_")
        .and_then(|rest| rest.split('_').next())
        .unwrap_or("unknown")
}
