use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

use super::dataset::EdaDataset;
use crate::constants::STAT_DECIMALS;
use crate::error::Result;
use crate::pipeline::storage::write_csv;
use crate::stats;

/// Descriptive statistics of one numeric column, rounded for reporting
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStatistics {
    pub variable: String,
    pub mean: f64,
    pub median: f64,
    pub variance: Option<f64>,
    pub std_dev: Option<f64>,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BasicStatistics {
    pub rows: Vec<ColumnStatistics>,
}

fn describe(name: &str, values: &[f64]) -> Option<ColumnStatistics> {
    let round = |v: f64| stats::round_to(v, STAT_DECIMALS);
    Some(ColumnStatistics {
        variable: name.to_string(),
        mean: round(stats::mean(values)?),
        median: round(stats::median(values)?),
        variance: stats::variance(values).map(round),
        std_dev: stats::std_dev(values).map(round),
        min: round(stats::min(values)?),
        max: round(stats::max(values)?),
        count: values.len(),
    })
}

impl BasicStatistics {
    /// Statistics for every numeric column with at least one present value
    pub fn compute(dataset: &EdaDataset) -> Self {
        if dataset.numeric.is_empty() {
            warn!("No numeric columns found");
        }
        let rows = dataset
            .numeric
            .iter()
            .filter_map(|column| describe(&column.name, &column.present()))
            .collect();
        Self { rows }
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        write_csv(path, &self.rows)?;
        info!("Saved basic statistics table to {}", path.display());
        Ok(())
    }

    pub fn get(&self, variable: &str) -> Option<&ColumnStatistics> {
        self.rows.iter().find(|r| r.variable == variable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Table;

    fn dataset() -> EdaDataset {
        let rows = [("1", "10", ""), ("2", "", ""), ("4", "", "")]
            .iter()
            .map(|(a, b, c)| {
                [a, b, c]
                    .iter()
                    .map(|v| if v.is_empty() { None } else { Some(v.to_string()) })
                    .collect()
            })
            .collect();
        EdaDataset::from_table(Table::from_rows(vec!["a".into(), "single".into(), "empty".into()], rows))
    }

    #[test]
    fn test_statistics_are_rounded() {
        let statistics = BasicStatistics::compute(&dataset());
        let a = statistics.get("a").unwrap();
        assert_eq!(a.mean, 2.33);
        assert_eq!(a.median, 2.0);
        assert_eq!(a.variance, Some(2.33));
        assert_eq!(a.std_dev, Some(1.53));
        assert_eq!(a.min, 1.0);
        assert_eq!(a.max, 4.0);
        assert_eq!(a.count, 3);
    }

    #[test]
    fn test_single_observation_has_no_variance() {
        let statistics = BasicStatistics::compute(&dataset());
        let single = statistics.get("single").unwrap();
        assert_eq!(single.count, 1);
        assert_eq!(single.variance, None);
        assert_eq!(single.std_dev, None);
    }

    #[test]
    fn test_columns_without_values_are_skipped() {
        let statistics = BasicStatistics::compute(&dataset());
        assert!(statistics.get("empty").is_none());
        assert_eq!(statistics.rows.len(), 2);
    }

    #[test]
    fn test_write_statistics_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("basic_statistics.csv");
        BasicStatistics::compute(&dataset()).write(&path).unwrap();

        let body = std::fs::read_to_string(&path).unwrap();
        let mut lines = body.lines();
        assert_eq!(lines.next(), Some("variable,mean,median,variance,std_dev,min,max,count"));
        assert_eq!(lines.next(), Some("a,2.33,2.0,2.33,1.53,1.0,4.0,3"));
        assert_eq!(lines.next(), Some("single,10.0,10.0,,,10.0,10.0,1"));
    }
}
