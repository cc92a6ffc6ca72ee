//! Phase-organized metrics for the batch pipelines
//!
//! Each phase owns its metric names in a dedicated submodule. A Prometheus
//! recorder is installed once per process; since runs are short-lived the
//! snapshot is rendered in-process and written next to the other outputs
//! instead of being scraped.

pub mod aggregate;
pub mod analysis;
pub mod normalize;
pub mod reconcile;
pub mod registry;
pub mod timing;

pub use aggregate::AggregateMetrics;
pub use analysis::AnalysisMetrics;
pub use normalize::NormalizeMetrics;
pub use reconcile::ReconcileMetrics;
pub use timing::{time_stage, TimingGuard};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::{Once, OnceLock};
use tracing::{debug, warn};

static INIT: Once = Once::new();
static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder and register every phase's metrics.
///
/// Idempotent. When another recorder is already installed the pipeline keeps
/// running and no snapshot is produced.
pub fn init_metrics() {
    INIT.call_once(|| match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            if HANDLE.set(handle).is_err() {
                warn!("Metrics handle was already set");
            }
            registry::register_all_metrics();
            debug!("Prometheus recorder installed");
        }
        Err(e) => {
            warn!("Failed to install Prometheus recorder: {}", e);
        }
    });
}

/// Render the current metrics in Prometheus text format
pub fn render_snapshot() -> Option<String> {
    HANDLE.get().map(|handle| handle.render())
}

/// Registration hooks each phase provides
pub trait PhaseMetrics {
    /// Pre-register the phase's metrics so they appear in a snapshot even at zero
    fn register_metrics();

    fn phase_name() -> &'static str;

    fn metrics_documentation() -> Vec<MetricDoc>;
}

/// Documentation for a single metric
#[derive(Debug, Clone)]
pub struct MetricDoc {
    pub name: &'static str,
    pub metric_type: MetricType,
    pub help: &'static str,
    pub labels: Vec<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Counter,
    Histogram,
    Gauge,
}

/// Build a metric name following `catalog_{phase}_{name}[_total]`
macro_rules! phase_metric {
    (counter, $phase:literal, $name:literal) => {
        concat!("catalog_", $phase, "_", $name, "_total")
    };
    (histogram, $phase:literal, $name:literal) => {
        concat!("catalog_", $phase, "_", $name)
    };
    (gauge, $phase:literal, $name:literal) => {
        concat!("catalog_", $phase, "_", $name)
    };
}

pub(crate) use phase_metric;
