use anyhow::Result;
use catalog_analytics::config::Config;
use catalog_analytics::constants::WEEKLY_DASHBOARD_FILE;
use catalog_analytics::driver::run_weekly;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const EVENTS: &str = "\
user_id,product_id,interaction_type,timestamp
u1,p1,view,01/01/2024 10:00
u1,p1,purchase,02/01/2024 11:00
u2,p2,purchase,2024-01-09 09:30:00
u2,p2,like,2024-01-10 09:30:00
u3,p9,purchase,2024-01-10 12:00:00
u3,p1,,2024-01-10 12:00:00
u4,p1,view,not a date
u5,p2,purchase,30/12/2024 08:00
";

const CLEANED_CATALOG: &str = "\
product_id,product_name,category,selling_price,list_price
p1,Desk,Home|Furniture,30.0,50.0
p2,Lamp,Home|Lighting,85.0,100.0
";

fn config_in(dir: &Path, charts: bool) -> Result<Config> {
    fs::write(dir.join("events.csv"), EVENTS)?;
    fs::write(dir.join("cleaned.csv"), CLEANED_CATALOG)?;
    let mut config = Config::default();
    config.weekly.events = dir.join("events.csv");
    config.weekly.products = dir.join("cleaned.csv");
    config.weekly.output_dir = dir.join("processed");
    config.report.charts = charts;
    Ok(config)
}

#[test]
fn test_weekly_rollups_by_iso_week() -> Result<()> {
    let temp_dir = tempdir()?;
    let outcome = run_weekly(&config_in(temp_dir.path(), false)?)?;

    assert_eq!(outcome.events.rows, 8);
    assert_eq!(outcome.events.loaded, 6);
    assert_eq!(outcome.events.missing_interaction_type, 1);
    assert_eq!(outcome.events.unparseable_timestamp, 1);

    let report = &outcome.report;
    let sales: Vec<(String, usize)> = report.sales.iter().map(|s| (s.week.label(), s.total_sales)).collect();
    assert_eq!(
        sales,
        vec![
            ("2024-W01".to_string(), 1),
            ("2024-W02".to_string(), 2),
            ("2025-W01".to_string(), 1),
        ]
    );

    // The unknown product adds a purchase but no revenue
    let week_two = &report.revenue[1];
    assert_eq!(week_two.total_revenue, 85.0);
    assert_eq!(week_two.order_count, 1);

    let top = &report.top_categories[1];
    assert_eq!(top.items.len(), 1);
    assert_eq!(top.items[0].name, "Home|Lighting");
    assert!(outcome.dashboard.is_none());
    Ok(())
}

#[test]
fn test_overall_summary() -> Result<()> {
    let temp_dir = tempdir()?;
    let outcome = run_weekly(&config_in(temp_dir.path(), false)?)?;
    let summary = &outcome.report.summary;

    assert_eq!(summary.total_interactions, 6);
    assert_eq!(summary.total_purchases, 4);
    assert_eq!(summary.total_views, 1);
    assert_eq!(summary.total_likes, 1);
    assert_eq!(summary.total_revenue, 200.0);
    assert_eq!(summary.unique_products_sold, 3);
    assert_eq!(summary.weeks, 3);
    assert_eq!(summary.period_start.map(|d| d.to_string()).as_deref(), Some("2024-01-01"));
    assert_eq!(summary.period_end.map(|d| d.to_string()).as_deref(), Some("2024-12-30"));

    let rate = summary.conversion_rate.unwrap();
    assert!((rate - 66.666).abs() < 0.01);
    Ok(())
}

#[test]
fn test_dashboard_written_when_charts_enabled() -> Result<()> {
    let temp_dir = tempdir()?;
    let outcome = run_weekly(&config_in(temp_dir.path(), true)?)?;

    let dashboard = outcome.dashboard.expect("dashboard path");
    assert_eq!(dashboard, temp_dir.path().join("processed").join(WEEKLY_DASHBOARD_FILE));
    assert!(fs::read_to_string(dashboard)?.contains("<svg"));
    Ok(())
}
