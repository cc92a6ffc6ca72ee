use plotters::prelude::*;
use std::path::{Path, PathBuf};
use tracing::info;

use super::{draw_empty_panel, draw_pie, index_label, open_figure, truncate_label, zero_based_range, Area, FONT};
use crate::constants::PIE_LABEL_MAX_CHARS;
use crate::error::{AnalyticsError, Result};
use crate::metrics::AnalysisMetrics;
use crate::pipeline::processing::aggregate::WeeklyReport;
use crate::types::InteractionKind;

const SALES_COLOR: RGBColor = RGBColor(33, 150, 243);
const REVENUE_COLOR: RGBColor = RGBColor(76, 175, 80);
const CONVERSION_COLOR: RGBColor = RGBColor(255, 152, 0);
const AOV_COLOR: RGBColor = RGBColor(156, 39, 176);
/// Most week labels printed on one axis
const MAX_WEEK_TICKS: usize = 12;

/// Line over week indices; absent values are left out of the line
fn draw_week_line(
    area: &Area,
    title: &str,
    y_desc: &str,
    weeks: &[String],
    values: &[Option<f64>],
    color: RGBColor,
) -> Result<()> {
    if weeks.is_empty() {
        return draw_empty_panel(area, title);
    }
    let points: Vec<(f64, f64)> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i as f64, v)))
        .collect();

    let mut chart = ChartBuilder::on(area)
        .caption(title, (FONT, 18))
        .margin(10)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5..weeks.len() as f64 - 0.5, zero_based_range(points.iter().map(|p| p.1)))
        .map_err(AnalyticsError::chart)?;
    chart
        .configure_mesh()
        .x_labels(weeks.len().min(MAX_WEEK_TICKS))
        .x_label_formatter(&|x| index_label(weeks, *x))
        .y_desc(y_desc)
        .draw()
        .map_err(AnalyticsError::chart)?;

    chart
        .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))
        .map_err(AnalyticsError::chart)?;
    chart
        .draw_series(points.iter().map(|&p| Circle::new(p, 3, color.filled())))
        .map_err(AnalyticsError::chart)?;
    Ok(())
}

fn draw_week_bars(area: &Area, title: &str, y_desc: &str, weeks: &[String], values: &[f64], color: RGBColor) -> Result<()> {
    if weeks.is_empty() {
        return draw_empty_panel(area, title);
    }
    let mut chart = ChartBuilder::on(area)
        .caption(title, (FONT, 18))
        .margin(10)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5..weeks.len() as f64 - 0.5, zero_based_range(values.iter().copied()))
        .map_err(AnalyticsError::chart)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(weeks.len().min(MAX_WEEK_TICKS))
        .x_label_formatter(&|x| index_label(weeks, *x))
        .y_desc(y_desc)
        .draw()
        .map_err(AnalyticsError::chart)?;

    chart
        .draw_series(values.iter().enumerate().map(|(i, &v)| {
            let x = i as f64;
            Rectangle::new([(x - 0.4, 0.0), (x + 0.4, v)], color.mix(0.8).filled())
        }))
        .map_err(AnalyticsError::chart)?;
    Ok(())
}

/// Interaction counts stacked per week: view, like and purchase first, other kinds after
fn draw_interaction_stack(area: &Area, report: &WeeklyReport) -> Result<()> {
    let title = "Weekly Interactions";
    if report.interactions.is_empty() {
        return draw_empty_panel(area, title);
    }
    let weeks: Vec<String> = report.interactions.iter().map(|w| w.week.label()).collect();

    let mut kinds: Vec<String> = [InteractionKind::View, InteractionKind::Like, InteractionKind::Purchase]
        .iter()
        .map(|k| k.as_str().to_string())
        .collect();
    for week in &report.interactions {
        for kind in week.counts.keys() {
            if !kinds.contains(kind) {
                kinds.push(kind.clone());
            }
        }
    }

    let totals = report.interactions.iter().map(|w| w.counts.values().sum::<usize>() as f64);
    let mut chart = ChartBuilder::on(area)
        .caption(title, (FONT, 18))
        .margin(10)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5..weeks.len() as f64 - 0.5, zero_based_range(totals))
        .map_err(AnalyticsError::chart)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(weeks.len().min(MAX_WEEK_TICKS))
        .x_label_formatter(&|x| index_label(&weeks, *x))
        .y_desc("Interactions")
        .draw()
        .map_err(AnalyticsError::chart)?;

    let mut base = vec![0.0; weeks.len()];
    for (index, kind) in kinds.iter().enumerate() {
        let color = Palette99::pick(index).to_rgba();
        let bars: Vec<Rectangle<(f64, f64)>> = report
            .interactions
            .iter()
            .enumerate()
            .map(|(i, week)| {
                let count = week.counts.get(kind).copied().unwrap_or(0) as f64;
                let x = i as f64;
                let bar = Rectangle::new([(x - 0.4, base[i]), (x + 0.4, base[i] + count)], color.filled());
                base[i] += count;
                bar
            })
            .collect();
        chart
            .draw_series(bars)
            .map_err(AnalyticsError::chart)?
            .label(kind.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }
    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(AnalyticsError::chart)?;
    Ok(())
}

/// Render the 3x2 weekly dashboard and return the written path
pub fn render_weekly_dashboard(report: &WeeklyReport, path: &Path) -> Result<PathBuf> {
    let root = open_figure(path, 2, 3)?;
    let root = root
        .titled("Weekly Sales Analysis", (FONT, 28))
        .map_err(AnalyticsError::chart)?;
    let panels = root.split_evenly((3, 2));

    let sales_weeks: Vec<String> = report.sales.iter().map(|s| s.week.label()).collect();
    let sales: Vec<Option<f64>> = report.sales.iter().map(|s| Some(s.total_sales as f64)).collect();
    draw_week_line(&panels[0], "Weekly Sales", "Purchases", &sales_weeks, &sales, SALES_COLOR)?;

    let revenue_weeks: Vec<String> = report.revenue.iter().map(|r| r.week.label()).collect();
    let revenue: Vec<f64> = report.revenue.iter().map(|r| r.total_revenue).collect();
    draw_week_bars(&panels[1], "Weekly Estimated Revenue ($)", "Revenue", &revenue_weeks, &revenue, REVENUE_COLOR)?;

    draw_interaction_stack(&panels[2], report)?;

    let conversion_weeks: Vec<String> = report.conversion.iter().map(|c| c.week.label()).collect();
    let conversion: Vec<Option<f64>> = report.conversion.iter().map(|c| Some(c.conversion_rate)).collect();
    draw_week_line(
        &panels[3],
        "Weekly Conversion Rate (%)",
        "Conversion %",
        &conversion_weeks,
        &conversion,
        CONVERSION_COLOR,
    )?;

    let aov: Vec<Option<f64>> = report.revenue.iter().map(|r| r.avg_order_value).collect();
    draw_week_line(&panels[4], "Weekly Average Order Value ($)", "AOV", &revenue_weeks, &aov, AOV_COLOR)?;

    let slices: Vec<(String, f64)> = report
        .overall_top_categories
        .iter()
        .map(|c| (truncate_label(&c.name, PIE_LABEL_MAX_CHARS), c.sales_count as f64))
        .collect();
    draw_pie(&panels[5], "Sales by Category (Top 8)", &slices)?;

    root.present().map_err(AnalyticsError::chart)?;
    AnalysisMetrics::record_chart_written();
    info!("Weekly dashboard saved to {}", path.display());
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::processing::aggregate::{join_events, WeeklyAggregator};
    use crate::pipeline::ingestion::CatalogEntry;
    use crate::types::InteractionEvent;
    use chrono::NaiveDateTime;

    fn event(product: &str, kind: &str, ts: &str) -> InteractionEvent {
        InteractionEvent {
            user_id: None,
            product_id: Some(product.to_string()),
            kind: InteractionKind::parse(kind),
            timestamp: NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M").unwrap(),
        }
    }

    #[test]
    fn test_dashboard_is_written() {
        let catalog = vec![CatalogEntry {
            product_id: Some("p1".to_string()),
            product_name: Some("Desk".to_string()),
            category: Some("Home & Kitchen | Furniture".to_string()),
            selling_price: Some(99.5),
            list_price: None,
        }];
        let events = vec![
            event("p1", "view", "2024-01-02 09:00"),
            event("p1", "purchase", "2024-01-02 10:00"),
            event("p1", "share", "2024-01-09 10:00"),
            event("p1", "purchase", "2024-01-10 10:00"),
        ];
        let report = WeeklyAggregator::new().aggregate(&join_events(&events, &catalog));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("charts").join("weekly.svg");
        let written = render_weekly_dashboard(&report, &path).unwrap();

        let svg = std::fs::read_to_string(&written).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Weekly Sales Analysis"));
        assert!(svg.contains("(100.0%)"));
    }

    #[test]
    fn test_empty_report_still_renders() {
        let report = WeeklyAggregator::new().aggregate(&[]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weekly.svg");
        render_weekly_dashboard(&report, &path).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("No data"));
    }
}
