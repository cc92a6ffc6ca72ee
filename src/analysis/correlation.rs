use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

use super::dataset::EdaDataset;
use crate::constants::{MAX_SCATTER_PLOTS, SCATTER_MIN_ABS_CORRELATION, TOP_CORRELATIONS};
use crate::metrics::AnalysisMetrics;
use crate::stats::pearson;

/// Symmetric Pearson matrix over the numeric columns.
///
/// Entries are absent where the coefficient is undefined (fewer than two
/// complete pairs or a constant column).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn compute(dataset: &EdaDataset) -> Self {
        let n = dataset.numeric.len();
        let mut values = vec![vec![None; n]; n];
        for i in 0..n {
            for j in i..n {
                let r = pearson(&dataset.numeric[i].values, &dataset.numeric[j].values);
                // Self-correlation is exactly 1 whenever it is defined
                let r = if i == j { r.map(|_| 1.0) } else { r };
                values[i][j] = r;
                values[j][i] = r;
            }
        }
        Self {
            columns: dataset.numeric.iter().map(|c| c.name.clone()).collect(),
            values,
        }
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.values.get(i).and_then(|row| row.get(j)).copied().flatten()
    }

    /// Defined coefficients above the diagonal, in column order
    pub fn upper_pairs(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        let n = self.columns.len();
        (0..n).flat_map(move |i| (i + 1..n).filter_map(move |j| self.get(i, j).map(|r| (i, j, r))))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    Positive,
    Negative,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Positive => write!(f, "Positive"),
            Direction::Negative => write!(f, "Negative"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationPair {
    pub first: String,
    pub second: String,
    pub coefficient: f64,
    pub direction: Direction,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationReport {
    pub matrix: CorrelationMatrix,
    /// Strongest pairs by absolute coefficient
    pub strongest: Vec<CorrelationPair>,
}

impl CorrelationReport {
    /// `None` (with a warning) when fewer than two numeric columns exist
    pub fn compute(dataset: &EdaDataset) -> Option<Self> {
        if dataset.numeric.len() < 2 {
            warn!("Correlation analysis needs at least two numeric columns, found {}", dataset.numeric.len());
            return None;
        }

        let matrix = CorrelationMatrix::compute(dataset);
        let mut pairs: Vec<CorrelationPair> = matrix
            .upper_pairs()
            .map(|(i, j, r)| CorrelationPair {
                first: matrix.columns[i].clone(),
                second: matrix.columns[j].clone(),
                coefficient: r,
                direction: if r > 0.0 { Direction::Positive } else { Direction::Negative },
            })
            .collect();
        AnalysisMetrics::record_correlation_pairs(pairs.len());

        pairs.sort_by(|a, b| b.coefficient.abs().total_cmp(&a.coefficient.abs()));
        pairs.truncate(TOP_CORRELATIONS);
        info!("Computed {}x{} correlation matrix", matrix.columns.len(), matrix.columns.len());

        Some(Self { matrix, strongest: pairs })
    }

    /// Pairs worth a scatter plot: the first few in column order with a
    /// coefficient beyond the plotting threshold
    pub fn scatter_pairs(&self) -> Vec<(usize, usize, f64)> {
        self.matrix
            .upper_pairs()
            .filter(|(_, _, r)| r.abs() > SCATTER_MIN_ABS_CORRELATION)
            .take(MAX_SCATTER_PLOTS)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Table;

    fn dataset(columns: Vec<(&str, Vec<Option<f64>>)>) -> EdaDataset {
        let headers = columns.iter().map(|(name, _)| name.to_string()).collect();
        let len = columns[0].1.len();
        let rows = (0..len)
            .map(|i| columns.iter().map(|(_, values)| values[i].map(|v| v.to_string())).collect())
            .collect();
        EdaDataset::from_table(Table::from_rows(headers, rows))
    }

    #[test]
    fn test_matrix_is_symmetric_with_unit_diagonal() {
        let data = dataset(vec![
            ("x", vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)]),
            ("y", vec![Some(2.0), Some(4.1), Some(5.9), Some(8.0)]),
            ("z", vec![Some(4.0), Some(1.0), Some(3.0), Some(2.0)]),
        ]);
        let matrix = CorrelationMatrix::compute(&data);

        for i in 0..3 {
            assert_eq!(matrix.get(i, i), Some(1.0));
            for j in 0..3 {
                assert_eq!(matrix.get(i, j), matrix.get(j, i));
            }
        }
        assert!(matrix.get(0, 1).unwrap() > 0.99);
    }

    #[test]
    fn test_constant_column_is_undefined() {
        let data = dataset(vec![
            ("x", vec![Some(1.0), Some(2.0), Some(3.0)]),
            ("flat", vec![Some(5.0), Some(5.0), Some(5.0)]),
        ]);
        let report = CorrelationReport::compute(&data).unwrap();
        assert_eq!(report.matrix.get(1, 1), None);
        assert_eq!(report.matrix.get(0, 1), None);
        assert!(report.strongest.is_empty());
    }

    #[test]
    fn test_fewer_than_two_columns_is_skipped() {
        let data = dataset(vec![("x", vec![Some(1.0), Some(2.0)])]);
        assert!(CorrelationReport::compute(&data).is_none());
    }

    #[test]
    fn test_strongest_pairs_sorted_by_magnitude() {
        let data = dataset(vec![
            ("a", vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)]),
            ("b", vec![Some(4.0), Some(3.0), Some(2.0), Some(1.0)]),
            ("c", vec![Some(1.0), Some(3.0), Some(2.0), Some(4.0)]),
        ]);
        let report = CorrelationReport::compute(&data).unwrap();

        assert_eq!(report.strongest.len(), 3);
        let top = &report.strongest[0];
        assert_eq!((top.first.as_str(), top.second.as_str()), ("a", "b"));
        assert_eq!(top.direction, Direction::Negative);
        assert!(report.strongest[1].coefficient.abs() >= report.strongest[2].coefficient.abs());
    }

    #[test]
    fn test_scatter_pairs_respect_threshold_and_limit() {
        let data = dataset(vec![
            ("a", vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)]),
            ("b", vec![Some(1.0), Some(2.0), Some(3.0), Some(5.0)]),
            ("c", vec![Some(2.0), Some(1.0), Some(4.0), Some(3.0)]),
            ("d", vec![Some(4.0), Some(3.0), Some(2.0), Some(1.0)]),
        ]);
        let report = CorrelationReport::compute(&data).unwrap();
        let pairs = report.scatter_pairs();

        assert_eq!(pairs.len(), 3);
        assert_eq!((pairs[0].0, pairs[0].1), (0, 1));
        assert!(pairs.iter().all(|(_, _, r)| r.abs() > 0.1));
    }

    #[test]
    fn test_pairwise_complete_observations() {
        let data = dataset(vec![
            ("x", vec![Some(1.0), Some(2.0), None, Some(3.0)]),
            ("y", vec![Some(2.0), Some(4.0), Some(100.0), Some(6.0)]),
        ]);
        let report = CorrelationReport::compute(&data).unwrap();
        let r = report.matrix.get(0, 1).unwrap();
        assert!((r - 1.0).abs() < 1e-12);
    }
}
