//! Human-facing output: fixed-width console tables and SVG charts

pub mod charts;
pub mod table;

pub use table::TextTable;

use crate::analysis::{BasicInfo, BasicStatistics, CorrelationReport, EdaDataset, EdaSummary};
use crate::pipeline::ingestion::DedupSummary;
use crate::pipeline::processing::aggregate::WeeklyReport;
use crate::pipeline::processing::normalize::NormalizationSummary;
use crate::pipeline::processing::quality_gate::QualityReport;
use crate::pipeline::processing::reconcile::ReconcileSummary;

const RULE_WIDTH: usize = 60;

fn banner(title: &str) {
    println!("\n{}", "=".repeat(RULE_WIDTH));
    println!("{}", title);
    println!("{}", "=".repeat(RULE_WIDTH));
}

/// Optional number, `-` when absent
pub fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.*}", decimals, v))
}

/// Integer with thousands separators
pub fn fmt_count(value: usize) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Dollar amount with thousands separators and two decimals
pub fn fmt_money(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, fmt_count((cents / 100) as usize), cents % 100)
}

pub fn print_cleaning_report(
    dedup: &DedupSummary,
    normalization: &NormalizationSummary,
    reconcile: &ReconcileSummary,
    quality: &QualityReport,
) {
    banner("🧹 CLEANING SUMMARY");
    println!("   Rows kept: {}", fmt_count(quality.rows));
    println!("   Exact duplicates removed: {}", dedup.exact_duplicates);
    println!("   Repeated product ids removed: {}", dedup.id_duplicates);
    println!(
        "   Unparsed cells: selling {} / list {} / quantity {} / weight {} / dimensions {}",
        normalization.unparsed_selling_price,
        normalization.unparsed_list_price,
        normalization.unparsed_quantity,
        normalization.unparsed_weight,
        normalization.unparsed_dimensions
    );
    println!("   Price swaps: {}", reconcile.swapped);
    println!(
        "   Imputed prices: selling {} / list {}",
        reconcile.imputed_selling, reconcile.imputed_list
    );
    println!("   Mean discount: {}%", fmt_opt(reconcile.mean_discount_pct, 2));

    banner("MISSING VALUES");
    if quality.missing.is_empty() {
        println!("No missing values");
    } else {
        let mut table = TextTable::new(&["column", "missing", "percent"]);
        for m in &quality.missing {
            table.row(vec![m.column.to_string(), m.missing.to_string(), format!("{:.1}", m.percent)]);
        }
        table.print();
    }
    if !quality.raw_missing.is_empty() {
        println!("Loaded columns not written out:");
        let mut table = TextTable::new(&["column", "missing", "percent"]);
        for m in &quality.raw_missing {
            table.row(vec![m.column.to_string(), m.missing.to_string(), format!("{:.1}", m.percent)]);
        }
        table.print();
    }

    banner("NUMERIC SUMMARY");
    let mut table = TextTable::new(&["column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"]);
    for d in &quality.describe {
        table.row(vec![
            d.column.to_string(),
            d.count.to_string(),
            fmt_opt(d.mean, 2),
            fmt_opt(d.std, 2),
            fmt_opt(d.min, 2),
            fmt_opt(d.q25, 2),
            fmt_opt(d.median, 2),
            fmt_opt(d.q75, 2),
            fmt_opt(d.max, 2),
        ]);
    }
    table.print();

    banner("PRICE OUTLIERS (IQR)");
    let mut table = TextTable::new(&["column", "q1", "q3", "iqr", "lower", "upper", "outliers"]);
    for o in &quality.outliers {
        table.row(vec![
            o.column.to_string(),
            format!("{:.2}", o.fences.q1),
            format!("{:.2}", o.fences.q3),
            format!("{:.2}", o.fences.iqr),
            format!("{:.2}", o.fences.lower),
            format!("{:.2}", o.fences.upper),
            o.outliers.to_string(),
        ]);
    }
    table.print();

    banner("MAIN CATEGORIES (Top 10)");
    let mut table = TextTable::new(&["main_category", "products"]);
    for c in &quality.top_main_categories {
        table.row(vec![c.category.clone(), fmt_count(c.count)]);
    }
    table.print();
}

pub fn print_weekly_report(report: &WeeklyReport) {
    banner("WEEKLY SALES");
    let mut table = TextTable::new(&["year_week", "total_sales"]);
    for s in &report.sales {
        table.row(vec![s.week.label(), s.total_sales.to_string()]);
    }
    table.print();

    banner("WEEKLY ESTIMATED REVENUE");
    let mut table = TextTable::new(&["year_week", "total_revenue", "avg_order_value", "order_count"]);
    for r in &report.revenue {
        table.row(vec![
            r.week.label(),
            format!("{:.2}", r.total_revenue),
            fmt_opt(r.avg_order_value, 2),
            r.order_count.to_string(),
        ]);
    }
    table.print();

    banner("WEEKLY INTERACTIONS");
    let kinds: Vec<String> = report
        .interactions
        .iter()
        .flat_map(|w| w.counts.keys().cloned())
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .collect();
    let mut headers = vec!["year_week"];
    headers.extend(kinds.iter().map(String::as_str));
    let mut table = TextTable::new(&headers);
    for w in &report.interactions {
        let mut cells = vec![w.week.label()];
        cells.extend(kinds.iter().map(|k| w.counts.get(k).copied().unwrap_or(0).to_string()));
        table.row(cells);
    }
    table.print();

    for (title, header, rankings) in [
        ("WEEKLY TOP CATEGORIES (Top 5)", "category", &report.top_categories),
        ("WEEKLY TOP PRODUCTS (Top 5)", "product_name", &report.top_products),
    ] {
        banner(title);
        let mut table = TextTable::new(&["year_week", header, "sales_count"]);
        for ranking in rankings {
            for item in &ranking.items {
                table.row(vec![ranking.week.label(), item.name.clone(), item.sales_count.to_string()]);
            }
        }
        table.print();
    }

    banner("WEEKLY CONVERSION RATE (%)");
    let mut table = TextTable::new(&["year_week", "total_interactions", "total_purchases", "conversion_rate"]);
    for c in &report.conversion {
        table.row(vec![
            c.week.label(),
            c.total_interactions.to_string(),
            c.total_purchases.to_string(),
            format!("{:.2}", c.conversion_rate),
        ]);
    }
    table.print();

    let s = &report.summary;
    banner("📊 OVERALL SUMMARY");
    println!("   Total interactions    : {}", fmt_count(s.total_interactions));
    println!("   Total purchases       : {}", fmt_count(s.total_purchases));
    println!("   Total views           : {}", fmt_count(s.total_views));
    println!("   Total likes           : {}", fmt_count(s.total_likes));
    println!("   Conversion rate       : {}%", fmt_opt(s.conversion_rate, 2));
    println!("   Estimated revenue     : {}", fmt_money(s.total_revenue));
    println!(
        "   Average order value   : {}",
        s.avg_order_value.map_or_else(|| "-".to_string(), fmt_money)
    );
    println!("   Unique products sold  : {}", fmt_count(s.unique_products_sold));
    if let (Some(start), Some(end)) = (s.period_start, s.period_end) {
        println!("   Analysis period       : {} - {}", start, end);
    }
    println!("   Weeks                 : {}", s.weeks);
}

pub fn print_basic_info(dataset: &EdaDataset, info: &BasicInfo) {
    banner("📋 DATASET OVERVIEW");
    println!("   Rows: {}", fmt_count(info.rows));
    println!("   Columns: {}", info.columns);
    println!("   Numeric columns: {}", info.numeric_columns);
    println!("   Categorical columns: {}", info.categorical_columns);

    println!("\nFirst rows:");
    let headers: Vec<&str> = dataset.table.headers.iter().map(String::as_str).collect();
    let mut head = TextTable::new(&headers).max_cell_width(24);
    for row in dataset.head() {
        head.row(row.iter().map(|c| c.clone().unwrap_or_else(|| "-".to_string())).collect());
    }
    head.print();

    println!("\nColumn types and missing values:");
    let mut table = TextTable::new(&["column", "type", "missing", "missing_pct"]);
    for c in &info.columns_info {
        table.row(vec![c.name.clone(), c.kind.to_string(), c.missing.to_string(), format!("{:.2}", c.missing_pct)]);
    }
    table.print();
}

pub fn print_statistics(statistics: &BasicStatistics) {
    banner("BASIC STATISTICS");
    if statistics.rows.is_empty() {
        println!("No numeric columns found");
        return;
    }
    let mut table = TextTable::new(&["variable", "mean", "median", "variance", "std_dev", "min", "max", "count"]);
    for r in &statistics.rows {
        table.row(vec![
            r.variable.clone(),
            format!("{:.2}", r.mean),
            format!("{:.2}", r.median),
            fmt_opt(r.variance, 2),
            fmt_opt(r.std_dev, 2),
            format!("{:.2}", r.min),
            format!("{:.2}", r.max),
            r.count.to_string(),
        ]);
    }
    table.print();
}

pub fn print_correlation(report: &CorrelationReport) {
    banner("CORRELATION ANALYSIS");
    let mut headers = vec![""];
    headers.extend(report.matrix.columns.iter().map(String::as_str));
    let mut table = TextTable::new(&headers);
    for (i, name) in report.matrix.columns.iter().enumerate() {
        let mut cells = vec![name.clone()];
        cells.extend((0..report.matrix.columns.len()).map(|j| fmt_opt(report.matrix.get(i, j), 5)));
        table.row(cells);
    }
    table.print();

    if !report.strongest.is_empty() {
        println!("\nStrongest correlations:");
        for (rank, pair) in report.strongest.iter().enumerate() {
            println!(
                "{}. {} <-> {}: {:.3} ({})",
                rank + 1,
                pair.first,
                pair.second,
                pair.coefficient,
                pair.direction
            );
        }
    }
}

pub fn print_eda_summary(summary: &EdaSummary) {
    banner("✅ ANALYSIS SUMMARY");
    for line in summary.lines() {
        println!("   {}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_count_groups_thousands() {
        assert_eq!(fmt_count(0), "0");
        assert_eq!(fmt_count(999), "999");
        assert_eq!(fmt_count(1000), "1,000");
        assert_eq!(fmt_count(1234567), "1,234,567");
    }

    #[test]
    fn test_fmt_money() {
        assert_eq!(fmt_money(1234.5), "$1,234.50");
        assert_eq!(fmt_money(0.0), "$0.00");
        assert_eq!(fmt_money(-12.5), "-$12.50");
    }

    #[test]
    fn test_fmt_opt() {
        assert_eq!(fmt_opt(Some(1.0), 2), "1.00");
        assert_eq!(fmt_opt(None, 2), "-");
    }
}
