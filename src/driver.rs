//! Stage sequencing.
//!
//! Every CLI command runs through [`Driver`]: the requested stages execute in
//! order, the first failure is reported and the rest are skipped. Whatever
//! happened, a metrics snapshot and a JSON run summary are written at the end.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use tracing::{error, info, instrument, warn};

use crate::analysis::{BasicInfo, BasicStatistics, CorrelationReport, EdaDataset, EdaSummary};
use crate::config::Config;
use crate::constants::{BASIC_STATISTICS_FILE, METRICS_SNAPSHOT_FILE, RUN_SUMMARY_FILE, WEEKLY_DASHBOARD_FILE};
use crate::metrics::{render_snapshot, time_stage};
use crate::pipeline::ingestion::{
    deduplicate, load_catalog, load_interactions, load_products, DedupSummary, InteractionLoadSummary,
};
use crate::pipeline::processing::aggregate::{join_events, WeeklyAggregator, WeeklyReport};
use crate::pipeline::processing::normalize::{NormalizationSummary, ProductNormalizer};
use crate::pipeline::processing::quality_gate::QualityReport;
use crate::pipeline::processing::reconcile::{ReconcileSummary, Reconciler};
use crate::pipeline::storage::{ensure_parent_dir, write_clean_products, write_json};
use crate::report::{self, charts};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Normalize and reconcile the raw product catalog
    Clean,
    /// Weekly sales and conversion report
    Weekly,
    /// Exploratory analysis of the content catalog
    Eda,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Clean => "clean",
            Stage::Weekly => "weekly",
            Stage::Eda => "eda",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CleanOutcome {
    pub output: PathBuf,
    pub dedup: DedupSummary,
    pub normalization: NormalizationSummary,
    pub reconcile: ReconcileSummary,
    pub quality: QualityReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeeklyOutcome {
    pub events: InteractionLoadSummary,
    pub report: WeeklyReport,
    pub dashboard: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EdaOutcome {
    pub info: BasicInfo,
    pub statistics: BasicStatistics,
    pub correlation: Option<CorrelationReport>,
    pub summary: EdaSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct StageFailure {
    pub stage: Stage,
    pub error: String,
}

/// Machine-readable record of one driver run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub completed: Vec<Stage>,
    pub failed: Option<StageFailure>,
    pub skipped: Vec<Stage>,
    pub clean: Option<CleanOutcome>,
    pub weekly: Option<WeeklyOutcome>,
    pub eda: Option<EdaOutcome>,
}

impl RunSummary {
    pub fn succeeded(&self) -> bool {
        self.failed.is_none()
    }
}

/// Normalize, reconcile and assess the raw catalog, then write the cleaned table
#[instrument(skip_all, fields(input = %config.cleaning.input.display()))]
pub fn run_clean(config: &Config) -> Result<CleanOutcome> {
    let _timer = time_stage("clean");
    let input = &config.cleaning.input;

    let raw = load_products(input).with_context(|| format!("loading product catalog {}", input.display()))?;
    let (raw, dedup) = deduplicate(raw);
    let (products, normalization) = ProductNormalizer::new().normalize_batch(&raw);
    let (products, reconcile) = Reconciler::new().reconcile(products);
    let quality = QualityReport::assess(&products, &raw);

    let output = config.cleaning.output.clone();
    write_clean_products(&output, &products)
        .with_context(|| format!("writing cleaned catalog {}", output.display()))?;

    report::print_cleaning_report(&dedup, &normalization, &reconcile, &quality);
    info!("Cleaning finished: {} products written", products.len());
    Ok(CleanOutcome { output, dedup, normalization, reconcile, quality })
}

/// Join the interaction log onto the catalog and roll it up by ISO week
#[instrument(skip_all, fields(events = %config.weekly.events.display()))]
pub fn run_weekly(config: &Config) -> Result<WeeklyOutcome> {
    let _timer = time_stage("weekly");
    let weekly = &config.weekly;

    let (events, load) = load_interactions(&weekly.events)
        .with_context(|| format!("loading interaction log {}", weekly.events.display()))?;
    let catalog = load_catalog(&weekly.products)
        .with_context(|| format!("loading product catalog {}", weekly.products.display()))?;

    let joined = join_events(&events, &catalog);
    let report = WeeklyAggregator::new().aggregate(&joined);
    report::print_weekly_report(&report);

    let dashboard = if config.report.charts {
        let path = weekly.output_dir.join(WEEKLY_DASHBOARD_FILE);
        Some(charts::render_weekly_dashboard(&report, &path).context("rendering weekly dashboard")?)
    } else {
        None
    };

    Ok(WeeklyOutcome { events: load, report, dashboard })
}

/// Type, describe and correlate the content catalog
#[instrument(skip_all, fields(input = %config.eda.input.display()))]
pub fn run_eda(config: &Config) -> Result<EdaOutcome> {
    let _timer = time_stage("eda");
    let eda = &config.eda;

    let dataset = EdaDataset::load(&eda.input).with_context(|| format!("loading {}", eda.input.display()))?;
    let info = dataset.basic_info();
    report::print_basic_info(&dataset, &info);

    let statistics = BasicStatistics::compute(&dataset);
    report::print_statistics(&statistics);
    let statistics_path = eda.output_dir.join(BASIC_STATISTICS_FILE);
    let statistics_written = if statistics.rows.is_empty() {
        None
    } else {
        statistics
            .write(&statistics_path)
            .with_context(|| format!("writing {}", statistics_path.display()))?;
        Some(statistics_path)
    };

    let correlation = CorrelationReport::compute(&dataset);
    if let Some(correlation) = &correlation {
        report::print_correlation(correlation);
    }

    let chart_paths = if config.report.charts {
        charts::render_eda_charts(&dataset, correlation.as_ref(), &eda.output_dir)
            .context("rendering analysis charts")?
            .paths()
    } else {
        Vec::new()
    };

    let summary = EdaSummary::new(&dataset, &statistics, correlation.as_ref(), statistics_written, chart_paths);
    report::print_eda_summary(&summary);
    Ok(EdaOutcome { info, statistics, correlation, summary })
}

pub struct Driver<'a> {
    config: &'a Config,
}

impl<'a> Driver<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Run `stages` in order, halting at the first failure
    pub fn run(&self, stages: &[Stage]) -> RunSummary {
        let mut summary = RunSummary::default();

        for (position, &stage) in stages.iter().enumerate() {
            println!("\n▶️  Running stage: {}", stage);
            let result = match stage {
                Stage::Clean => run_clean(self.config).map(|o| summary.clean = Some(o)),
                Stage::Weekly => run_weekly(self.config).map(|o| summary.weekly = Some(o)),
                Stage::Eda => run_eda(self.config).map(|o| summary.eda = Some(o)),
            };

            match result {
                Ok(()) => {
                    println!("✅ Stage {} completed", stage);
                    summary.completed.push(stage);
                }
                Err(e) => {
                    error!("Stage {} failed: {:#}", stage, e);
                    println!("❌ Stage {} failed: {:#}", stage, e);
                    summary.failed = Some(StageFailure { stage, error: format!("{:#}", e) });
                    summary.skipped = stages[position + 1..].to_vec();
                    if !summary.skipped.is_empty() {
                        warn!("Skipping remaining stages: {:?}", summary.skipped);
                    }
                    break;
                }
            }
        }

        if let Err(e) = self.write_run_artifacts(&summary) {
            warn!("Failed to write run artifacts: {:#}", e);
        }
        summary
    }

    fn write_run_artifacts(&self, summary: &RunSummary) -> Result<()> {
        let dir = &self.config.driver.output_dir;
        let summary_path = dir.join(RUN_SUMMARY_FILE);
        write_json(&summary_path, summary).with_context(|| format!("writing {}", summary_path.display()))?;

        if let Some(snapshot) = render_snapshot() {
            let metrics_path = dir.join(METRICS_SNAPSHOT_FILE);
            ensure_parent_dir(&metrics_path)?;
            fs::write(&metrics_path, snapshot).with_context(|| format!("writing {}", metrics_path.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_names() {
        assert_eq!(Stage::Clean.to_string(), "clean");
        assert_eq!(serde_json::to_string(&Stage::Weekly).unwrap(), "\"weekly\"");
        let stage: Stage = serde_json::from_str("\"eda\"").unwrap();
        assert_eq!(stage, Stage::Eda);
    }

    #[test]
    fn test_missing_input_halts_the_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.cleaning.input = dir.path().join("missing.csv");
        config.driver.output_dir = dir.path().join("out");
        config.report.charts = false;

        let summary = Driver::new(&config).run(&[Stage::Clean, Stage::Weekly, Stage::Eda]);

        assert!(!summary.succeeded());
        let failure = summary.failed.as_ref().unwrap();
        assert_eq!(failure.stage, Stage::Clean);
        assert!(failure.error.contains("missing.csv"));
        assert_eq!(summary.skipped, vec![Stage::Weekly, Stage::Eda]);
        assert!(summary.completed.is_empty());
        assert!(dir.path().join("out").join(RUN_SUMMARY_FILE).exists());
    }
}
