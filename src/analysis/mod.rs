//! Exploratory analysis of a content catalog.
//!
//! Each step takes the previous step's result by reference and returns a new
//! value: `EdaDataset` -> `BasicStatistics` -> `Option<CorrelationReport>` ->
//! `EdaSummary`. Nothing is mutated after construction.

pub mod correlation;
pub mod dataset;
pub mod statistics;

pub use correlation::{CorrelationMatrix, CorrelationPair, CorrelationReport, Direction};
pub use dataset::{BasicInfo, ColumnInfo, ColumnKind, EdaDataset, NumericColumn, Table};
pub use statistics::{BasicStatistics, ColumnStatistics};

use serde::Serialize;
use std::path::PathBuf;

/// Closing summary of an analysis run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdaSummary {
    pub rows: usize,
    pub numeric_columns: usize,
    pub categorical_columns: usize,
    pub statistics_written: Option<PathBuf>,
    pub correlation_computed: bool,
    pub strongest_pairs: Vec<CorrelationPair>,
    pub charts: Vec<PathBuf>,
}

impl EdaSummary {
    pub fn new(
        dataset: &EdaDataset,
        statistics: &BasicStatistics,
        correlation: Option<&CorrelationReport>,
        statistics_written: Option<PathBuf>,
        charts: Vec<PathBuf>,
    ) -> Self {
        Self {
            rows: dataset.row_count(),
            numeric_columns: dataset.numeric.len(),
            categorical_columns: dataset.categorical.len(),
            statistics_written: statistics_written.filter(|_| !statistics.rows.is_empty()),
            correlation_computed: correlation.is_some(),
            strongest_pairs: correlation.map(|c| c.strongest.clone()).unwrap_or_default(),
            charts,
        }
    }

    /// Human-readable findings, one per line
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Analyzed {} titles", self.rows),
            format!("Examined {} numeric columns", self.numeric_columns),
        ];
        if let Some(path) = &self.statistics_written {
            lines.push(format!("Basic statistics saved to {}", path.display()));
        }
        if self.correlation_computed {
            lines.push("Correlation analysis completed".to_string());
        }
        if let Some(top) = self.strongest_pairs.first() {
            lines.push(format!(
                "Strongest correlation: {} <-> {} ({:.3}, {})",
                top.first, top.second, top.coefficient, top.direction
            ));
        }
        if !self.charts.is_empty() {
            lines.push(format!("{} charts written", self.charts.len()));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_threads_results() {
        let table = Table::from_rows(
            vec!["a".into(), "b".into(), "label".into()],
            vec![
                vec![Some("1".into()), Some("2".into()), Some("x".into())],
                vec![Some("2".into()), Some("4".into()), Some("y".into())],
                vec![Some("3".into()), Some("7".into()), None],
            ],
        );
        let dataset = EdaDataset::from_table(table);
        let statistics = BasicStatistics::compute(&dataset);
        let correlation = CorrelationReport::compute(&dataset);
        let summary = EdaSummary::new(
            &dataset,
            &statistics,
            correlation.as_ref(),
            Some(PathBuf::from("data/basic_statistics.csv")),
            vec![],
        );

        assert_eq!(summary.rows, 3);
        assert_eq!(summary.numeric_columns, 2);
        assert_eq!(summary.categorical_columns, 1);
        assert!(summary.correlation_computed);
        assert_eq!(summary.strongest_pairs.len(), 1);
        assert!(summary.lines().iter().any(|l| l.starts_with("Strongest correlation: a <-> b")));
    }

    #[test]
    fn test_summary_without_numeric_columns() {
        let table = Table::from_rows(vec!["title".into()], vec![vec![Some("Heat".into())]]);
        let dataset = EdaDataset::from_table(table);
        let statistics = BasicStatistics::compute(&dataset);
        let summary = EdaSummary::new(&dataset, &statistics, None, Some(PathBuf::from("x.csv")), vec![]);

        assert_eq!(summary.statistics_written, None);
        assert!(!summary.correlation_computed);
        assert_eq!(summary.lines().len(), 2);
    }
}
