use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{info, instrument};

use crate::constants::{OVERALL_TOP_CATEGORIES, WEEKLY_TOP_N};
use crate::metrics::AggregateMetrics;
use crate::pipeline::ingestion::CatalogEntry;
use crate::types::{InteractionEvent, InteractionKind, WeekBucket};

/// An interaction event left-joined with the product it refers to
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedEvent {
    pub week: WeekBucket,
    pub date: NaiveDate,
    pub kind: InteractionKind,
    pub product_id: Option<String>,
    pub product_name: Option<String>,
    pub category: Option<String>,
    pub selling_price: Option<f64>,
}

impl JoinedEvent {
    pub fn is_purchase(&self) -> bool {
        self.kind == InteractionKind::Purchase
    }
}

/// Left join events onto the catalog by product id.
///
/// Events whose product is unknown keep their row with the product fields
/// absent. When the catalog repeats an id the first entry is used.
pub fn join_events(events: &[InteractionEvent], catalog: &[CatalogEntry]) -> Vec<JoinedEvent> {
    let mut by_id: HashMap<&str, &CatalogEntry> = HashMap::with_capacity(catalog.len());
    for entry in catalog {
        if let Some(id) = entry.product_id.as_deref() {
            by_id.entry(id).or_insert(entry);
        }
    }

    events
        .iter()
        .map(|event| {
            let product = event.product_id.as_deref().and_then(|id| by_id.get(id).copied());
            JoinedEvent {
                week: event.week(),
                date: event.timestamp.date(),
                kind: event.kind.clone(),
                product_id: event.product_id.clone(),
                product_name: product.and_then(|p| p.product_name.clone()),
                category: product.and_then(|p| p.category.clone()),
                selling_price: product.and_then(|p| p.selling_price),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklySales {
    pub week: WeekBucket,
    pub total_sales: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyRevenue {
    pub week: WeekBucket,
    pub total_revenue: f64,
    pub avg_order_value: Option<f64>,
    /// Purchases with a known selling price
    pub order_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyInteractions {
    pub week: WeekBucket,
    /// Count per interaction type; view, like and purchase are always present
    pub counts: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyConversion {
    pub week: WeekBucket,
    pub total_interactions: usize,
    pub total_purchases: usize,
    pub conversion_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedItem {
    pub name: String,
    pub sales_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyRanking {
    pub week: WeekBucket,
    pub items: Vec<RankedItem>,
}

/// Whole-period totals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallSummary {
    pub total_interactions: usize,
    pub total_purchases: usize,
    pub total_views: usize,
    pub total_likes: usize,
    pub conversion_rate: Option<f64>,
    pub total_revenue: f64,
    pub avg_order_value: Option<f64>,
    pub unique_products_sold: usize,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    pub weeks: usize,
}

/// All weekly rollups, every list ordered by week
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyReport {
    pub sales: Vec<WeeklySales>,
    pub revenue: Vec<WeeklyRevenue>,
    pub interactions: Vec<WeeklyInteractions>,
    pub conversion: Vec<WeeklyConversion>,
    pub top_categories: Vec<WeeklyRanking>,
    pub top_products: Vec<WeeklyRanking>,
    pub overall_top_categories: Vec<RankedItem>,
    pub summary: OverallSummary,
}

/// How many entries the rankings keep
#[derive(Debug, Clone)]
pub struct AggregateConfig {
    pub weekly_top_n: usize,
    pub overall_top_categories: usize,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self { weekly_top_n: WEEKLY_TOP_N, overall_top_categories: OVERALL_TOP_CATEGORIES }
    }
}

/// Highest counts first; equal counts keep ascending key order
fn rank(counts: BTreeMap<String, usize>, n: usize) -> Vec<RankedItem> {
    let mut items: Vec<RankedItem> =
        counts.into_iter().map(|(name, sales_count)| RankedItem { name, sales_count }).collect();
    items.sort_by(|a, b| b.sales_count.cmp(&a.sales_count));
    items.truncate(n);
    items
}

fn weekly_ranking<F>(purchases: &[&JoinedEvent], n: usize, key: F) -> Vec<WeeklyRanking>
where
    F: Fn(&JoinedEvent) -> Option<&str>,
{
    let mut per_week: BTreeMap<WeekBucket, BTreeMap<String, usize>> = BTreeMap::new();
    for event in purchases {
        if let Some(name) = key(event) {
            *per_week.entry(event.week).or_default().entry(name.to_string()).or_insert(0) += 1;
        }
    }
    per_week
        .into_iter()
        .map(|(week, counts)| WeeklyRanking { week, items: rank(counts, n) })
        .collect()
}

pub struct WeeklyAggregator {
    pub config: AggregateConfig,
}

impl Default for WeeklyAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl WeeklyAggregator {
    pub fn new() -> Self {
        Self { config: AggregateConfig::default() }
    }

    pub fn with_config(config: AggregateConfig) -> Self {
        Self { config }
    }

    #[instrument(skip_all, fields(events = joined.len()))]
    pub fn aggregate(&self, joined: &[JoinedEvent]) -> WeeklyReport {
        let purchases: Vec<&JoinedEvent> = joined.iter().filter(|e| e.is_purchase()).collect();

        // Sales and revenue cover only weeks with at least one purchase
        let mut purchases_by_week: BTreeMap<WeekBucket, Vec<&JoinedEvent>> = BTreeMap::new();
        for event in &purchases {
            purchases_by_week.entry(event.week).or_default().push(event);
        }

        let sales = purchases_by_week
            .iter()
            .map(|(week, events)| WeeklySales { week: *week, total_sales: events.len() })
            .collect();

        let revenue = purchases_by_week
            .iter()
            .map(|(week, events)| {
                let prices: Vec<f64> = events.iter().filter_map(|e| e.selling_price).collect();
                let total_revenue: f64 = prices.iter().sum();
                WeeklyRevenue {
                    week: *week,
                    total_revenue,
                    avg_order_value: (!prices.is_empty()).then(|| total_revenue / prices.len() as f64),
                    order_count: prices.len(),
                }
            })
            .collect();

        let mut all_by_week: BTreeMap<WeekBucket, Vec<&JoinedEvent>> = BTreeMap::new();
        for event in joined {
            all_by_week.entry(event.week).or_default().push(event);
        }

        let interactions = all_by_week
            .iter()
            .map(|(week, events)| {
                let mut counts: BTreeMap<String, usize> = [InteractionKind::View, InteractionKind::Like, InteractionKind::Purchase]
                    .iter()
                    .map(|k| (k.as_str().to_string(), 0))
                    .collect();
                for event in events {
                    *counts.entry(event.kind.as_str().to_string()).or_insert(0) += 1;
                }
                WeeklyInteractions { week: *week, counts }
            })
            .collect();

        let conversion = all_by_week
            .iter()
            .map(|(week, events)| {
                let total_purchases = events.iter().filter(|e| e.is_purchase()).count();
                WeeklyConversion {
                    week: *week,
                    total_interactions: events.len(),
                    total_purchases,
                    conversion_rate: total_purchases as f64 / events.len() as f64 * 100.0,
                }
            })
            .collect();

        let n = self.config.weekly_top_n;
        let top_categories = weekly_ranking(&purchases, n, |e| e.category.as_deref());
        let top_products = weekly_ranking(&purchases, n, |e| e.product_name.as_deref());

        let mut category_counts: BTreeMap<String, usize> = BTreeMap::new();
        for event in &purchases {
            if let Some(category) = event.category.as_deref() {
                *category_counts.entry(category.to_string()).or_insert(0) += 1;
            }
        }
        let overall_top_categories = rank(category_counts, self.config.overall_top_categories);

        let summary = Self::summarize(joined, &purchases, all_by_week.len());
        info!(
            "Aggregated {} events over {} weeks ({} purchases)",
            summary.total_interactions, summary.weeks, summary.total_purchases
        );
        AggregateMetrics::record_report(summary.weeks, summary.total_purchases);

        WeeklyReport {
            sales,
            revenue,
            interactions,
            conversion,
            top_categories,
            top_products,
            overall_top_categories,
            summary,
        }
    }

    fn summarize(joined: &[JoinedEvent], purchases: &[&JoinedEvent], weeks: usize) -> OverallSummary {
        let count_kind = |kind: InteractionKind| joined.iter().filter(|e| e.kind == kind).count();
        let prices: Vec<f64> = purchases.iter().filter_map(|e| e.selling_price).collect();
        let total_revenue: f64 = prices.iter().sum();
        let unique_products: BTreeSet<&str> = purchases.iter().filter_map(|e| e.product_id.as_deref()).collect();

        OverallSummary {
            total_interactions: joined.len(),
            total_purchases: purchases.len(),
            total_views: count_kind(InteractionKind::View),
            total_likes: count_kind(InteractionKind::Like),
            conversion_rate: (!joined.is_empty())
                .then(|| purchases.len() as f64 / joined.len() as f64 * 100.0),
            total_revenue,
            avg_order_value: (!prices.is_empty()).then(|| total_revenue / prices.len() as f64),
            unique_products_sold: unique_products.len(),
            period_start: joined.iter().map(|e| e.date).min(),
            period_end: joined.iter().map(|e| e.date).max(),
            weeks,
        }
    }
}
