use csv::ReaderBuilder;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::{info, instrument, warn};

use crate::error::{AnalyticsError, Result};
use crate::metrics::AnalysisMetrics;
use crate::pipeline::ingestion::require_file;
use crate::stats::round_to;

/// Column coerced to numbers even when some cells do not parse
pub const RELEASE_YEAR_COLUMN: &str = "release_year";
/// Free-text column whose leading number becomes `duration_numeric`
pub const DURATION_COLUMN: &str = "duration";
pub const DURATION_NUMERIC_COLUMN: &str = "duration_numeric";
const HEAD_ROWS: usize = 5;

/// Cell values read as missing, matching the usual CSV export conventions
const MISSING_MARKERS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>", "N/A",
    "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn read_cell(cell: &str) -> Option<String> {
    let cell = cell.trim();
    (!cell.is_empty() && !MISSING_MARKERS.contains(&cell)).then(|| cell.to_string())
}

static FIRST_INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid integer regex"));

/// A loaded delimited file: headers plus rows of optional cells
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl Table {
    /// Build a table, padding short rows with absent cells
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, None);
                row
            })
            .collect();
        Self { headers, rows }
    }

    /// Read a CSV file. Empty cells and missing markers such as `NaN` or `N/A` load as absent.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self> {
        require_file(path)?;
        let mut reader = ReaderBuilder::new().flexible(true).from_path(path)?;
        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(read_cell).collect());
        }
        Ok(Self::from_rows(headers, rows))
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn column(&self, index: usize) -> impl Iterator<Item = Option<&str>> {
        self.rows.iter().map(move |row| row.get(index).and_then(|c| c.as_deref()))
    }

    /// Cells of a named column
    pub fn column_by_name(&self, name: &str) -> Option<Vec<Option<&str>>> {
        self.column_index(name).map(|i| self.column(i).collect())
    }

    fn push_column(&mut self, name: &str, values: Vec<Option<String>>) {
        self.headers.push(name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Numeric => write!(f, "numeric"),
            ColumnKind::Categorical => write!(f, "categorical"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumericColumn {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

impl NumericColumn {
    pub fn present(&self) -> Vec<f64> {
        self.values.iter().flatten().copied().collect()
    }
}

/// Per-column row of the basic info table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub kind: ColumnKind,
    pub missing: usize,
    pub missing_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasicInfo {
    pub rows: usize,
    pub columns: usize,
    pub numeric_columns: usize,
    pub categorical_columns: usize,
    pub columns_info: Vec<ColumnInfo>,
}

/// A typed view of the content table
#[derive(Debug, Clone, PartialEq)]
pub struct EdaDataset {
    pub table: Table,
    /// Numeric columns in table order, derived columns included
    pub numeric: Vec<NumericColumn>,
    pub categorical: Vec<String>,
}

fn parse_number(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn leading_integer(cell: &str) -> Option<f64> {
    FIRST_INTEGER.find(cell).and_then(|m| m.as_str().parse::<f64>().ok())
}

impl EdaDataset {
    pub fn load(path: &Path) -> Result<Self> {
        let table = Table::load(path)?;
        if table.headers.is_empty() {
            return Err(AnalyticsError::EmptyDataset(path.display().to_string()));
        }
        info!("Loaded {} rows and {} columns", table.rows.len(), table.headers.len());
        Ok(Self::from_table(table))
    }

    /// Classify every column and add the derived ones.
    ///
    /// A column is numeric when every present cell parses as a number.
    /// `release_year` is coerced (unparseable cells become absent) and
    /// `duration` gains a `duration_numeric` companion from its first integer.
    pub fn from_table(mut table: Table) -> Self {
        let mut numeric = Vec::new();
        let mut categorical = Vec::new();
        let mut derived_duration = None;

        for (index, name) in table.headers.clone().into_iter().enumerate() {
            let parsed: Vec<Option<f64>> = table.column(index).map(|c| c.and_then(parse_number)).collect();
            let all_parse = table
                .column(index)
                .zip(&parsed)
                .all(|(cell, value)| cell.is_none() || value.is_some());

            if all_parse {
                numeric.push(NumericColumn { name, values: parsed });
            } else if name == RELEASE_YEAR_COLUMN {
                let coerced = parsed.iter().filter(|v| v.is_none()).count()
                    - table.column(index).filter(|c| c.is_none()).count();
                warn!("Coerced {} unparseable {} values to missing", coerced, name);
                for (row, value) in table.rows.iter_mut().zip(&parsed) {
                    if value.is_none() {
                        row[index] = None;
                    }
                }
                numeric.push(NumericColumn { name, values: parsed });
            } else {
                if name == DURATION_COLUMN {
                    let values: Vec<Option<f64>> = table.column(index).map(|c| c.and_then(leading_integer)).collect();
                    derived_duration = Some(values);
                    numeric.push(NumericColumn {
                        name: DURATION_NUMERIC_COLUMN.to_string(),
                        values: Vec::new(),
                    });
                }
                categorical.push(name);
            }
        }

        if let Some(values) = derived_duration {
            let cells = values.iter().map(|v| v.map(|n| n.to_string())).collect();
            table.push_column(DURATION_NUMERIC_COLUMN, cells);
            if let Some(column) = numeric.iter_mut().find(|c| c.name == DURATION_NUMERIC_COLUMN) {
                column.values = values;
            }
        }

        AnalysisMetrics::record_dataset(table.rows.len(), numeric.len(), categorical.len());
        Self { table, numeric, categorical }
    }

    pub fn row_count(&self) -> usize {
        self.table.rows.len()
    }

    pub fn numeric_column(&self, name: &str) -> Option<&NumericColumn> {
        self.numeric.iter().find(|c| c.name == name)
    }

    pub fn kind_of(&self, name: &str) -> ColumnKind {
        if self.numeric_column(name).is_some() {
            ColumnKind::Numeric
        } else {
            ColumnKind::Categorical
        }
    }

    /// First rows of the table for display
    pub fn head(&self) -> &[Vec<Option<String>>] {
        &self.table.rows[..self.table.rows.len().min(HEAD_ROWS)]
    }

    pub fn basic_info(&self) -> BasicInfo {
        let rows = self.row_count();
        let columns_info = self
            .table
            .headers
            .iter()
            .enumerate()
            .map(|(index, name)| {
                let missing = self.table.column(index).filter(|c| c.is_none()).count();
                let missing_pct = if rows == 0 { 0.0 } else { round_to(missing as f64 / rows as f64 * 100.0, 2) };
                ColumnInfo { name: name.clone(), kind: self.kind_of(name), missing, missing_pct }
            })
            .collect();

        BasicInfo {
            rows,
            columns: self.table.headers.len(),
            numeric_columns: self.numeric.len(),
            categorical_columns: self.categorical.len(),
            columns_info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[&str]) -> Vec<Option<String>> {
        values.iter().map(|v| if v.is_empty() { None } else { Some(v.to_string()) }).collect()
    }

    fn titles() -> Table {
        Table::from_rows(
            vec!["show_id".into(), "type".into(), "release_year".into(), "duration".into(), "rating".into()],
            vec![
                cells(&["s1", "Movie", "2020", "90 min", "4.5"]),
                cells(&["s2", "TV Show", "2021", "2 Seasons", ""]),
                cells(&["s3", "Movie", "unknown", "", "3"]),
            ],
        )
    }

    #[test]
    fn test_missing_markers_keep_columns_numeric() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"title,score,votes\nA,1.5,10\nB,NaN,20\nC,2.5,N/A\nD,3.5,40\n").unwrap();

        let dataset = EdaDataset::load(file.path()).unwrap();
        let numeric: Vec<&str> = dataset.numeric.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(numeric, vec!["score", "votes"]);
        assert_eq!(dataset.categorical, vec!["title"]);
        assert_eq!(dataset.numeric_column("score").unwrap().values, vec![Some(1.5), None, Some(2.5), Some(3.5)]);
        assert_eq!(dataset.numeric_column("votes").unwrap().present(), vec![10.0, 20.0, 40.0]);
        assert_eq!(dataset.basic_info().columns_info[1].missing, 1);
    }

    #[test]
    fn test_column_typing() {
        let dataset = EdaDataset::from_table(titles());

        let numeric: Vec<&str> = dataset.numeric.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(numeric, vec!["release_year", "duration_numeric", "rating"]);
        assert_eq!(dataset.categorical, vec!["show_id", "type", "duration"]);
    }

    #[test]
    fn test_release_year_is_coerced() {
        let dataset = EdaDataset::from_table(titles());
        let years = dataset.numeric_column("release_year").unwrap();
        assert_eq!(years.values, vec![Some(2020.0), Some(2021.0), None]);
        assert_eq!(dataset.table.rows[2][2], None);
    }

    #[test]
    fn test_duration_numeric_takes_first_integer() {
        let dataset = EdaDataset::from_table(titles());
        let duration = dataset.numeric_column("duration_numeric").unwrap();
        assert_eq!(duration.values, vec![Some(90.0), Some(2.0), None]);
        assert_eq!(dataset.table.headers.last().map(String::as_str), Some("duration_numeric"));
        assert_eq!(dataset.table.rows[0].last().cloned().flatten().as_deref(), Some("90"));
    }

    #[test]
    fn test_basic_info_missing_percentages() {
        let info = EdaDataset::from_table(titles()).basic_info();
        assert_eq!(info.rows, 3);
        assert_eq!(info.columns, 6);
        assert_eq!(info.numeric_columns, 3);
        assert_eq!(info.categorical_columns, 3);

        let rating = info.columns_info.iter().find(|c| c.name == "rating").unwrap();
        assert_eq!(rating.missing, 1);
        assert_eq!(rating.missing_pct, 33.33);
        assert_eq!(rating.kind, ColumnKind::Numeric);
    }

    #[test]
    fn test_short_rows_are_padded() {
        let table = Table::from_rows(vec!["a".into(), "b".into()], vec![vec![Some("1".into())]]);
        assert_eq!(table.rows[0], vec![Some("1".to_string()), None]);
    }
}
