use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::{draw_empty_panel, draw_pie, grid_size, index_label, open_figure, padded_range, zero_based_range, Area, FONT};
use crate::analysis::dataset::RELEASE_YEAR_COLUMN;
use crate::analysis::{CorrelationReport, EdaDataset, NumericColumn};
use crate::constants::{
    BOXPLOTS_FILE, CONTENT_OVERVIEW_FILE, CORRELATION_HEATMAP_FILE, HISTOGRAMS_FILE, HISTOGRAM_BINS,
    SCATTERPLOTS_FILE,
};
use crate::error::{AnalyticsError, Result};
use crate::metrics::AnalysisMetrics;
use crate::stats::{self, IqrFences};

const HISTOGRAM_COLOR: RGBColor = RGBColor(135, 206, 235);
const SCATTER_COLOR: RGBColor = RGBColor(255, 127, 80);
const BOX_COLOR: RGBColor = RGBColor(70, 130, 180);
const TYPE_COLUMN: &str = "type";

/// Paths of the EDA figures that were written
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EdaChartSet {
    pub histograms: Option<PathBuf>,
    pub boxplots: Option<PathBuf>,
    pub scatterplots: Option<PathBuf>,
    pub heatmap: Option<PathBuf>,
    pub content_overview: Option<PathBuf>,
}

impl EdaChartSet {
    pub fn paths(&self) -> Vec<PathBuf> {
        [&self.histograms, &self.boxplots, &self.scatterplots, &self.heatmap, &self.content_overview]
            .into_iter()
            .flatten()
            .cloned()
            .collect()
    }
}

/// Equal-width bin counts between the smallest and largest value
pub fn histogram_bins(values: &[f64], bins: usize) -> Vec<(f64, f64, usize)> {
    let (Some(min), Some(max)) = (stats::min(values), stats::max(values)) else {
        return Vec::new();
    };
    if max - min <= f64::EPSILON || bins == 0 {
        return vec![(min - 0.5, max + 0.5, values.len())];
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for v in values {
        // The maximum falls into the last bin
        let index = (((v - min) / width) as usize).min(bins - 1);
        counts[index] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| (min + width * i as f64, min + width * (i + 1) as f64, count))
        .collect()
}

fn draw_histogram(area: &Area, column: &NumericColumn) -> Result<()> {
    let title = format!("{} distribution", column.name);
    let values = column.present();
    let bins = histogram_bins(&values, HISTOGRAM_BINS);
    let (Some(first), Some(last)) = (bins.first(), bins.last()) else {
        return draw_empty_panel(area, &title);
    };

    let mut chart = ChartBuilder::on(area)
        .caption(&title, (FONT, 16))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(first.0..last.1, zero_based_range(bins.iter().map(|b| b.2 as f64)))
        .map_err(AnalyticsError::chart)?;
    chart
        .configure_mesh()
        .x_desc(column.name.as_str())
        .y_desc("Frequency")
        .draw()
        .map_err(AnalyticsError::chart)?;
    chart
        .draw_series(bins.iter().map(|&(lo, hi, count)| {
            Rectangle::new([(lo, 0.0), (hi, count as f64)], HISTOGRAM_COLOR.mix(0.7).filled())
        }))
        .map_err(AnalyticsError::chart)?;
    chart
        .draw_series(
            bins.iter()
                .map(|&(lo, hi, count)| Rectangle::new([(lo, 0.0), (hi, count as f64)], BLACK.stroke_width(1))),
        )
        .map_err(AnalyticsError::chart)?;
    Ok(())
}

/// Box from Q1 to Q3, whiskers to the furthest values inside the IQR fences,
/// points beyond them drawn individually
fn draw_boxplot(area: &Area, column: &NumericColumn) -> Result<()> {
    let title = format!("{} boxplot", column.name);
    let values = column.present();
    let (Some(fences), Some(median)) = (IqrFences::from_values(&values), stats::median(&values)) else {
        return draw_empty_panel(area, &title);
    };
    let inside: Vec<f64> = values.iter().copied().filter(|v| !fences.is_outlier(*v)).collect();
    let low_whisker = stats::min(&inside).unwrap_or(fences.q1);
    let high_whisker = stats::max(&inside).unwrap_or(fences.q3);
    let y_range = padded_range(
        stats::min(&values).unwrap_or(fences.q1),
        stats::max(&values).unwrap_or(fences.q3),
    );

    let mut chart = ChartBuilder::on(area)
        .caption(&title, (FONT, 16))
        .margin(10)
        .x_label_area_size(20)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..1.0, y_range)
        .map_err(AnalyticsError::chart)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(2)
        .x_label_formatter(&|_| String::new())
        .y_desc(column.name.as_str())
        .draw()
        .map_err(AnalyticsError::chart)?;

    chart
        .draw_series(std::iter::once(Rectangle::new(
            [(0.3, fences.q1), (0.7, fences.q3)],
            BOX_COLOR.stroke_width(2),
        )))
        .map_err(AnalyticsError::chart)?;
    let segments = vec![
        vec![(0.3, median), (0.7, median)],
        vec![(0.5, fences.q3), (0.5, high_whisker)],
        vec![(0.5, fences.q1), (0.5, low_whisker)],
        vec![(0.4, high_whisker), (0.6, high_whisker)],
        vec![(0.4, low_whisker), (0.6, low_whisker)],
    ];
    chart
        .draw_series(segments.into_iter().map(|points| PathElement::new(points, BOX_COLOR.stroke_width(2))))
        .map_err(AnalyticsError::chart)?;
    chart
        .draw_series(
            values
                .iter()
                .filter(|v| fences.is_outlier(**v))
                .map(|&v| Circle::new((0.5, v), 3, BLACK.stroke_width(1))),
        )
        .map_err(AnalyticsError::chart)?;
    Ok(())
}

fn draw_numeric_grid<F>(dataset: &EdaDataset, path: &Path, draw: F) -> Result<PathBuf>
where
    F: Fn(&Area, &NumericColumn) -> Result<()>,
{
    let (rows, columns) = grid_size(dataset.numeric.len());
    let root = open_figure(path, columns, rows)?;
    let panels = root.split_evenly((rows, columns));
    for (panel, column) in panels.iter().zip(&dataset.numeric) {
        draw(panel, column)?;
    }
    root.present().map_err(AnalyticsError::chart)?;
    AnalysisMetrics::record_chart_written();
    info!("Saved {}", path.display());
    Ok(path.to_path_buf())
}

pub fn render_histograms(dataset: &EdaDataset, path: &Path) -> Result<PathBuf> {
    draw_numeric_grid(dataset, path, draw_histogram)
}

pub fn render_boxplots(dataset: &EdaDataset, path: &Path) -> Result<PathBuf> {
    draw_numeric_grid(dataset, path, draw_boxplot)
}

/// Up to three scatter plots for the correlated pairs `CorrelationReport::scatter_pairs` picks
pub fn render_scatterplots(dataset: &EdaDataset, correlation: &CorrelationReport, path: &Path) -> Result<Option<PathBuf>> {
    let pairs = correlation.scatter_pairs();
    if pairs.is_empty() {
        debug!("No correlated pairs to scatter");
        return Ok(None);
    }

    let root = open_figure(path, pairs.len(), 1)?;
    let panels = root.split_evenly((1, pairs.len()));
    for (panel, &(i, j, r)) in panels.iter().zip(&pairs) {
        let (x, y) = (&dataset.numeric[i], &dataset.numeric[j]);
        let points: Vec<(f64, f64)> = x
            .values
            .iter()
            .zip(&y.values)
            .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
            .collect();
        let xs: Vec<f64> = points.iter().map(|p| p.0).collect();
        let ys: Vec<f64> = points.iter().map(|p| p.1).collect();

        let mut chart = ChartBuilder::on(panel)
            .caption(format!("{} vs {} (r = {:.3})", x.name, y.name, r), (FONT, 16))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(
                padded_range(stats::min(&xs).unwrap_or(0.0), stats::max(&xs).unwrap_or(1.0)),
                padded_range(stats::min(&ys).unwrap_or(0.0), stats::max(&ys).unwrap_or(1.0)),
            )
            .map_err(AnalyticsError::chart)?;
        chart
            .configure_mesh()
            .x_desc(x.name.as_str())
            .y_desc(y.name.as_str())
            .draw()
            .map_err(AnalyticsError::chart)?;
        chart
            .draw_series(points.iter().map(|&p| Circle::new(p, 3, SCATTER_COLOR.mix(0.6).filled())))
            .map_err(AnalyticsError::chart)?;
    }

    root.present().map_err(AnalyticsError::chart)?;
    AnalysisMetrics::record_chart_written();
    info!("Saved {}", path.display());
    Ok(Some(path.to_path_buf()))
}

/// Blue for -1 through white at 0 to red for +1
pub fn diverging_color(r: f64) -> RGBColor {
    let t = r.clamp(-1.0, 1.0);
    let target = if t >= 0.0 { (178.0, 24.0, 43.0) } else { (33.0, 102.0, 172.0) };
    let a = t.abs();
    let blend = |to: f64| (255.0 + (to - 255.0) * a).round() as u8;
    RGBColor(blend(target.0), blend(target.1), blend(target.2))
}

/// Heatmap of the matrix below the diagonal, each cell annotated to 2 decimals
pub fn render_correlation_heatmap(correlation: &CorrelationReport, path: &Path) -> Result<PathBuf> {
    let matrix = &correlation.matrix;
    let n = matrix.columns.len();
    let root = open_figure(path, 2, 2)?;

    // Row 0 is drawn at the top
    let mut chart = ChartBuilder::on(&root)
        .caption("Correlation Matrix", (FONT, 22))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(140)
        .build_cartesian_2d(-0.5..n as f64 - 0.5, -0.5..n as f64 - 0.5)
        .map_err(AnalyticsError::chart)?;
    let row_labels: Vec<String> = matrix.columns.iter().rev().cloned().collect();
    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(n)
        .y_labels(n)
        .x_label_formatter(&|x| index_label(&matrix.columns, *x))
        .y_label_formatter(&|y| index_label(&row_labels, *y))
        .draw()
        .map_err(AnalyticsError::chart)?;

    let cell_y = |row: usize| (n - 1 - row) as f64;
    let cells: Vec<(usize, usize)> = (0..n).flat_map(|i| (0..i).map(move |j| (i, j))).collect();
    chart
        .draw_series(cells.iter().map(|&(i, j)| {
            let (x, y) = (j as f64, cell_y(i));
            let color = matrix.get(i, j).map_or(RGBColor(220, 220, 220), diverging_color);
            Rectangle::new([(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)], color.filled())
        }))
        .map_err(AnalyticsError::chart)?;

    let annotation = TextStyle::from((FONT, 14).into_font()).pos(Pos::new(HPos::Center, VPos::Center));
    chart
        .draw_series(cells.iter().map(|&(i, j)| {
            let label = matrix.get(i, j).map_or_else(|| "-".to_string(), |r| format!("{:.2}", r));
            Text::new(label, (j as f64, cell_y(i)), annotation.clone())
        }))
        .map_err(AnalyticsError::chart)?;

    root.present().map_err(AnalyticsError::chart)?;
    AnalysisMetrics::record_chart_written();
    info!("Saved {}", path.display());
    Ok(path.to_path_buf())
}

/// Share of each content type and titles per release year.
///
/// Written only when the table has a `type` column; the year panel is left
/// empty without `release_year`.
pub fn render_content_overview(dataset: &EdaDataset, path: &Path) -> Result<Option<PathBuf>> {
    let Some(types) = dataset.table.column_by_name(TYPE_COLUMN) else {
        return Ok(None);
    };

    let mut type_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for value in types.into_iter().flatten() {
        *type_counts.entry(value).or_insert(0) += 1;
    }
    let mut slices: Vec<(String, f64)> = type_counts.into_iter().map(|(k, v)| (k.to_string(), v as f64)).collect();
    slices.sort_by(|a, b| b.1.total_cmp(&a.1));

    let root = open_figure(path, 2, 1)?;
    let panels = root.split_evenly((1, 2));
    draw_pie(&panels[0], "Content Type Distribution", &slices)?;

    let title = "Titles per Release Year";
    let mut per_year: BTreeMap<i64, usize> = BTreeMap::new();
    if let Some(years) = dataset.numeric_column(RELEASE_YEAR_COLUMN) {
        for year in years.values.iter().flatten() {
            *per_year.entry(year.round() as i64).or_insert(0) += 1;
        }
    }
    match (per_year.keys().next(), per_year.keys().next_back()) {
        (Some(&first), Some(&last)) => {
            let points: Vec<(f64, f64)> = per_year.iter().map(|(&y, &c)| (y as f64, c as f64)).collect();
            let mut chart = ChartBuilder::on(&panels[1])
                .caption(title, (FONT, 18))
                .margin(10)
                .x_label_area_size(40)
                .y_label_area_size(60)
                .build_cartesian_2d(
                    padded_range(first as f64, last as f64),
                    zero_based_range(points.iter().map(|p| p.1)),
                )
                .map_err(AnalyticsError::chart)?;
            chart
                .configure_mesh()
                .x_desc("Year")
                .y_desc("Titles")
                .x_label_formatter(&|x| format!("{:.0}", x))
                .draw()
                .map_err(AnalyticsError::chart)?;
            chart
                .draw_series(LineSeries::new(points.iter().copied(), BLUE.stroke_width(2)))
                .map_err(AnalyticsError::chart)?;
            chart
                .draw_series(points.iter().map(|&p| Circle::new(p, 3, BLUE.filled())))
                .map_err(AnalyticsError::chart)?;
        }
        _ => draw_empty_panel(&panels[1], title)?,
    }

    root.present().map_err(AnalyticsError::chart)?;
    AnalysisMetrics::record_chart_written();
    info!("Saved {}", path.display());
    Ok(Some(path.to_path_buf()))
}

/// Every EDA figure that applies to the dataset
pub fn render_eda_charts(
    dataset: &EdaDataset,
    correlation: Option<&CorrelationReport>,
    output_dir: &Path,
) -> Result<EdaChartSet> {
    let mut charts = EdaChartSet::default();
    if !dataset.numeric.is_empty() {
        charts.histograms = Some(render_histograms(dataset, &output_dir.join(HISTOGRAMS_FILE))?);
        charts.boxplots = Some(render_boxplots(dataset, &output_dir.join(BOXPLOTS_FILE))?);
    }
    if let Some(correlation) = correlation {
        charts.scatterplots = render_scatterplots(dataset, correlation, &output_dir.join(SCATTERPLOTS_FILE))?;
        charts.heatmap = Some(render_correlation_heatmap(correlation, &output_dir.join(CORRELATION_HEATMAP_FILE))?);
    }
    charts.content_overview = render_content_overview(dataset, &output_dir.join(CONTENT_OVERVIEW_FILE))?;
    Ok(charts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Table;

    fn titles() -> EdaDataset {
        let rows = vec![
            ("Movie", "2019", "90 min", "1.0"),
            ("Movie", "2020", "100 min", "2.0"),
            ("TV Show", "2020", "1 Season", "2.5"),
            ("Movie", "2021", "120 min", "4.0"),
            ("TV Show", "2021", "3 Seasons", "3.0"),
        ]
        .into_iter()
        .map(|(t, y, d, s)| vec![Some(t.to_string()), Some(y.to_string()), Some(d.to_string()), Some(s.to_string())])
        .collect();
        EdaDataset::from_table(Table::from_rows(
            vec!["type".into(), "release_year".into(), "duration".into(), "score".into()],
            rows,
        ))
    }

    #[test]
    fn test_histogram_bins_cover_all_values() {
        let bins = histogram_bins(&[1.0, 2.0, 3.0, 4.0], 3);
        assert_eq!(bins.len(), 3);
        assert_eq!(bins.iter().map(|b| b.2).sum::<usize>(), 4);
        assert_eq!(bins[2].2, 2);
        assert_eq!(bins[0].0, 1.0);
    }

    #[test]
    fn test_histogram_of_constant_values() {
        let bins = histogram_bins(&[7.0, 7.0], 30);
        assert_eq!(bins, vec![(6.5, 7.5, 2)]);
        assert!(histogram_bins(&[], 30).is_empty());
    }

    #[test]
    fn test_diverging_color_endpoints() {
        assert_eq!(diverging_color(0.0), RGBColor(255, 255, 255));
        assert_eq!(diverging_color(1.0), RGBColor(178, 24, 43));
        assert_eq!(diverging_color(-1.0), RGBColor(33, 102, 172));
    }

    #[test]
    fn test_render_all_eda_charts() {
        let dataset = titles();
        let correlation = CorrelationReport::compute(&dataset);
        let dir = tempfile::tempdir().unwrap();

        let charts = render_eda_charts(&dataset, correlation.as_ref(), dir.path()).unwrap();
        assert!(charts.histograms.is_some());
        assert!(charts.boxplots.is_some());
        assert!(charts.heatmap.is_some());
        assert!(charts.content_overview.is_some());
        for path in charts.paths() {
            assert!(path.exists(), "{}", path.display());
        }

        let overview = std::fs::read_to_string(dir.path().join(CONTENT_OVERVIEW_FILE)).unwrap();
        assert!(overview.contains("Movie (60.0%)"));
    }

    #[test]
    fn test_content_overview_needs_type_column() {
        let dataset = EdaDataset::from_table(Table::from_rows(vec!["x".into()], vec![vec![Some("1".into())]]));
        let dir = tempfile::tempdir().unwrap();
        let written = render_content_overview(&dataset, &dir.path().join("overview.svg")).unwrap();
        assert!(written.is_none());
    }
}
