use anyhow::Result;
use catalog_analytics::config::Config;
use catalog_analytics::constants::{CLEANED_PRODUCT_COLUMNS, RUN_SUMMARY_FILE};
use catalog_analytics::driver::{run_clean, Driver, Stage};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const RAW_CATALOG: &str = "\
Uniqe Id,Product Name,Brand Name,Category,List Price,Selling Price,Quantity,Shipping Weight,Product Dimensions,Is Amazon Seller
p1,Desk,,Home|Furniture|Desks,$30.00,$50.00,2,1 pounds 6 ounces,6 x 7 x 0.1 inches,Y
p2,Lamp,Acme,Home|Lighting,$100.00,,,16 oz,,N
p3,Ball,Acme,,,$10.00 - $20.00,1.5,,,
p1,Desk again,,Home,$1.00,$1.00,,,,
p2,Lamp,Acme,Home|Lighting,$100.00,,,16 oz,,N
";

fn config_in(dir: &Path) -> Config {
    let mut config = Config::default();
    config.cleaning.input = dir.join("product_details.csv");
    config.cleaning.output = dir.join("out").join("cleaned_product_details.csv");
    config.driver.output_dir = dir.join("out");
    config
}

fn read_rows(path: &Path) -> Result<(Vec<String>, Vec<HashMap<String, String>>)> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(headers.iter().cloned().zip(record.iter().map(str::to_string)).collect());
    }
    Ok((headers, rows))
}

#[test]
fn test_clean_stage_writes_reconciled_catalog() -> Result<()> {
    let temp_dir = tempdir()?;
    fs::write(temp_dir.path().join("product_details.csv"), RAW_CATALOG)?;
    let config = config_in(temp_dir.path());

    let outcome = run_clean(&config)?;
    assert_eq!(outcome.dedup.exact_duplicates, 1);
    assert_eq!(outcome.dedup.id_duplicates, 1);
    assert_eq!(outcome.reconcile.swapped, 1);
    assert_eq!(outcome.reconcile.imputed_selling, 1);
    assert_eq!(outcome.reconcile.imputed_list, 1);

    let (headers, rows) = read_rows(&config.cleaning.output)?;
    assert_eq!(headers, CLEANED_PRODUCT_COLUMNS.to_vec());
    assert_eq!(rows.len(), 3);

    let desk = &rows[0];
    assert_eq!(desk["product_id"], "p1");
    assert_eq!(desk["brand"], "Unknown");
    assert_eq!(desk["main_category"], "Home");
    assert_eq!(desk["sub_category"], "Furniture");
    assert_eq!(desk["selling_price"], "30.0");
    assert_eq!(desk["list_price"], "50.0");
    assert_eq!(desk["discount_amount"], "20.0");
    assert_eq!(desk["discount_pct"], "40.0");
    assert_eq!(desk["quantity"], "2");
    assert_eq!(desk["shipping_weight_oz"], "22.0");
    assert_eq!(desk["dim_height"], "0.1");
    assert_eq!(desk["is_amazon_seller"], "True");

    let lamp = &rows[1];
    assert_eq!(lamp["selling_price"], "85.0");
    assert_eq!(lamp["discount_pct"], "15.0");
    assert_eq!(lamp["shipping_weight_oz"], "16.0");
    assert_eq!(lamp["dim_length"], "");
    assert_eq!(lamp["is_amazon_seller"], "False");

    let ball = &rows[2];
    assert_eq!(ball["selling_price"], "10.0");
    assert_eq!(ball["main_category"], "Unknown");
    assert_eq!(ball["sub_category"], "Unknown");
    assert_eq!(ball["quantity"], "1.5");
    assert_eq!(ball["list_price"], "11.5");
    assert_eq!(ball["discount_pct"], "13.04");
    Ok(())
}

#[test]
fn test_quality_report_covers_reconciled_rows() -> Result<()> {
    let temp_dir = tempdir()?;
    fs::write(temp_dir.path().join("product_details.csv"), RAW_CATALOG)?;
    let outcome = run_clean(&config_in(temp_dir.path()))?;

    assert_eq!(outcome.quality.rows, 3);
    let selling = outcome.quality.describe.iter().find(|d| d.column == "selling_price").unwrap();
    assert_eq!(selling.count, 3);
    assert_eq!(selling.min, Some(10.0));
    assert_eq!(selling.max, Some(85.0));
    // Every price is present after imputation
    assert!(outcome.quality.missing.iter().all(|m| m.column != "selling_price"));
    assert_eq!(outcome.quality.top_main_categories[0].category, "Home");

    let dims = outcome.quality.raw_missing.iter().find(|m| m.column == "product_dimensions").unwrap();
    assert_eq!((dims.missing, dims.percent), (2, 66.7));
    assert!(outcome.quality.raw_missing.iter().any(|m| m.column == "ingredients" && m.missing == 3));
    Ok(())
}

#[test]
fn test_driver_records_completed_stage() -> Result<()> {
    let temp_dir = tempdir()?;
    fs::write(temp_dir.path().join("product_details.csv"), RAW_CATALOG)?;
    let config = config_in(temp_dir.path());

    let summary = Driver::new(&config).run(&[Stage::Clean]);
    assert!(summary.succeeded());
    assert_eq!(summary.completed, vec![Stage::Clean]);

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(config.driver.output_dir.join(RUN_SUMMARY_FILE))?)?;
    assert_eq!(json["completed"][0], "clean");
    assert_eq!(json["clean"]["reconcile"]["swapped"], 1);
    assert!(json["failed"].is_null());
    Ok(())
}

#[test]
fn test_missing_catalog_fails_with_diagnostic() {
    let temp_dir = tempdir().unwrap();
    let err = run_clean(&config_in(temp_dir.path())).unwrap_err();
    let message = format!("{:#}", err);
    assert!(message.contains("product_details.csv"), "{}", message);
}
