use anyhow::Result;
use catalog_analytics::config::Config;
use catalog_analytics::constants::{BASIC_STATISTICS_FILE, CORRELATION_HEATMAP_FILE, HISTOGRAMS_FILE};
use catalog_analytics::driver::{run_eda, Driver, Stage};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const TITLES: &str = "\
show_id,type,title,director,release_year,rating,duration
s1,Movie,Alpha,Ann,2019,PG,90 min
s2,TV Show,Beta,,2020,TV-MA,2 Seasons
s3,Movie,\"Gamma, the Film\",Bob,2021,R,110 min
s4,Movie,Delta,Cy,2021,PG-13,95 min
s5,TV Show,Epsilon,,2018,TV-14,1 Season
";

fn config_in(dir: &Path, charts: bool) -> Result<Config> {
    fs::write(dir.join("netflix_titles.csv"), TITLES)?;
    let mut config = Config::default();
    config.eda.input = dir.join("netflix_titles.csv");
    config.eda.output_dir = dir.join("data");
    config.driver.output_dir = dir.join("data");
    config.report.charts = charts;
    Ok(config)
}

#[test]
fn test_eda_types_columns_and_writes_statistics() -> Result<()> {
    let temp_dir = tempdir()?;
    let config = config_in(temp_dir.path(), false)?;
    let outcome = run_eda(&config)?;

    assert_eq!(outcome.info.rows, 5);
    assert_eq!(outcome.info.columns, 8);
    assert_eq!(outcome.info.numeric_columns, 2);
    assert_eq!(outcome.info.categorical_columns, 6);

    let director = outcome.info.columns_info.iter().find(|c| c.name == "director").unwrap();
    assert_eq!(director.missing, 2);
    assert_eq!(director.missing_pct, 40.0);

    let year = outcome.statistics.get("release_year").unwrap();
    assert_eq!(year.mean, 2019.8);
    assert_eq!(year.median, 2020.0);
    assert_eq!(year.count, 5);

    let body = fs::read_to_string(config.eda.output_dir.join(BASIC_STATISTICS_FILE))?;
    assert!(body.starts_with("variable,mean,median,variance,std_dev,min,max,count\n"));
    assert!(body.contains("duration_numeric,"));
    Ok(())
}

#[test]
fn test_eda_correlation_and_charts() -> Result<()> {
    let temp_dir = tempdir()?;
    let config = config_in(temp_dir.path(), true)?;
    let outcome = run_eda(&config)?;

    let correlation = outcome.correlation.expect("two numeric columns");
    assert_eq!(correlation.matrix.columns, vec!["release_year", "duration_numeric"]);
    assert_eq!(correlation.matrix.get(0, 0), Some(1.0));
    assert_eq!(correlation.matrix.get(0, 1), correlation.matrix.get(1, 0));
    assert_eq!(correlation.strongest.len(), 1);

    assert!(config.eda.output_dir.join(HISTOGRAMS_FILE).exists());
    assert!(config.eda.output_dir.join(CORRELATION_HEATMAP_FILE).exists());
    assert!(outcome.summary.correlation_computed);
    assert!(!outcome.summary.charts.is_empty());
    Ok(())
}

#[test]
fn test_run_halts_after_failed_stage() -> Result<()> {
    let temp_dir = tempdir()?;
    let mut config = config_in(temp_dir.path(), false)?;
    config.weekly.events = temp_dir.path().join("no_events.csv");

    let summary = Driver::new(&config).run(&[Stage::Weekly, Stage::Eda]);

    assert!(!summary.succeeded());
    assert_eq!(summary.failed.as_ref().map(|f| f.stage), Some(Stage::Weekly));
    assert_eq!(summary.skipped, vec![Stage::Eda]);
    assert!(summary.eda.is_none());
    assert!(!config.eda.output_dir.join(BASIC_STATISTICS_FILE).exists());
    Ok(())
}
