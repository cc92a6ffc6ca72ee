//! SVG charts rendered with plotters.
//!
//! Only the SVG backend is compiled in, so text is emitted as SVG `<text>`
//! elements and no system fonts are needed at render time.

pub mod eda;
pub mod weekly;

pub use eda::{render_eda_charts, EdaChartSet};
pub use weekly::render_weekly_dashboard;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::f64::consts::PI;
use std::ops::Range;

use crate::error::{AnalyticsError, Result};

pub(crate) type Area<'a> = DrawingArea<SVGBackend<'a>, Shift>;

pub(crate) const FONT: &str = "sans-serif";
pub(crate) const PANEL_WIDTH: u32 = 600;
pub(crate) const PANEL_HEIGHT: u32 = 450;
/// Panels per row in grid figures
pub(crate) const GRID_COLUMNS: usize = 3;

/// A value range that always has positive width, padded by 5%
pub(crate) fn padded_range(min: f64, max: f64) -> Range<f64> {
    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }
    let span = max - min;
    if span.abs() < f64::EPSILON {
        let pad = if min == 0.0 { 1.0 } else { min.abs() * 0.1 };
        return (min - pad)..(max + pad);
    }
    (min - span * 0.05)..(max + span * 0.05)
}

/// `0..max*1.1`, or `0..1` when nothing is positive
pub(crate) fn zero_based_range(values: impl IntoIterator<Item = f64>) -> Range<f64> {
    let max = values.into_iter().fold(0.0_f64, f64::max);
    if max > 0.0 {
        0.0..max * 1.1
    } else {
        0.0..1.0
    }
}

/// Label for an integer tick on an index axis; empty for fractional ticks
pub(crate) fn index_label(labels: &[String], x: f64) -> String {
    let rounded = x.round();
    if (x - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    labels.get(rounded as usize).cloned().unwrap_or_default()
}

pub(crate) fn truncate_label(label: &str, max_chars: usize) -> String {
    if label.chars().count() > max_chars {
        format!("{}...", label.chars().take(max_chars).collect::<String>())
    } else {
        label.to_string()
    }
}

/// Split a figure into up to three panels per row
pub(crate) fn grid_size(panels: usize) -> (usize, usize) {
    let columns = panels.clamp(1, GRID_COLUMNS);
    let rows = (panels.max(1) + columns - 1) / columns;
    (rows, columns)
}

pub(crate) fn open_figure(path: &std::path::Path, columns: usize, rows: usize) -> Result<Area<'_>> {
    crate::pipeline::storage::ensure_parent_dir(path)?;
    let root = SVGBackend::new(path, (PANEL_WIDTH * columns as u32, PANEL_HEIGHT * rows as u32))
        .into_drawing_area();
    root.fill(&WHITE).map_err(AnalyticsError::chart)?;
    Ok(root)
}

/// Placeholder for a panel without data
pub(crate) fn draw_empty_panel(area: &Area, title: &str) -> Result<()> {
    let area = area.titled(title, (FONT, 18)).map_err(AnalyticsError::chart)?;
    let (w, h) = area.dim_in_pixel();
    let style = TextStyle::from((FONT, 14).into_font()).pos(Pos::new(HPos::Center, VPos::Center));
    area.draw(&Text::new("No data", (w as i32 / 2, h as i32 / 2), style))
        .map_err(AnalyticsError::chart)?;
    Ok(())
}

/// Pie chart drawn from polygons, slices counter-clockwise from twelve o'clock
pub(crate) fn draw_pie(area: &Area, title: &str, slices: &[(String, f64)]) -> Result<()> {
    let total: f64 = slices.iter().map(|(_, v)| v).sum();
    if slices.is_empty() || total <= 0.0 {
        return draw_empty_panel(area, title);
    }

    let area = area.titled(title, (FONT, 18)).map_err(AnalyticsError::chart)?;
    let (w, h) = area.dim_in_pixel();
    let center = (w as f64 / 2.0, h as f64 / 2.0);
    let radius = w.min(h) as f64 * 0.32;
    let at = |angle: f64, r: f64| {
        ((center.0 + r * angle.cos()) as i32, (center.1 - r * angle.sin()) as i32)
    };

    let mut start = PI / 2.0;
    for (index, (label, value)) in slices.iter().enumerate() {
        let sweep = value / total * 2.0 * PI;
        let steps = ((sweep / (PI / 90.0)).ceil() as usize).max(1);
        let mut points = vec![at(0.0, 0.0)];
        points.extend((0..=steps).map(|s| at(start + sweep * s as f64 / steps as f64, radius)));

        let color = Palette99::pick(index).to_rgba();
        area.draw(&Polygon::new(points, color.filled())).map_err(AnalyticsError::chart)?;

        let middle = start + sweep / 2.0;
        let anchor = if middle.cos() >= 0.0 { HPos::Left } else { HPos::Right };
        let style = TextStyle::from((FONT, 12).into_font()).pos(Pos::new(anchor, VPos::Center));
        let text = format!("{} ({:.1}%)", label, value / total * 100.0);
        area.draw(&Text::new(text, at(middle, radius * 1.12), style))
            .map_err(AnalyticsError::chart)?;

        start += sweep;
    }
    Ok(())
}
