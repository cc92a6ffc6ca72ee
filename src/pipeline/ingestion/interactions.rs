use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

use super::require_file;
use crate::error::Result;
use crate::metrics::AggregateMetrics;
use crate::types::{InteractionEvent, InteractionKind};

/// Timestamp layouts seen in the interaction log, day-first where ambiguous
const DATETIME_FORMATS: [&str; 10] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
];
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];

/// Parse a mixed-format timestamp, preferring day-first readings
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Rows dropped while loading the interaction log
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct InteractionLoadSummary {
    pub rows: usize,
    pub loaded: usize,
    pub missing_interaction_type: usize,
    pub unparseable_timestamp: usize,
}

fn cell(record: &StringRecord, index: usize) -> Option<String> {
    record
        .get(index)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Load the interaction log.
///
/// Columns are positional (user id, product id, interaction type, timestamp);
/// the header row is skipped and any trailing columns are ignored. Rows with
/// no interaction type or an unreadable timestamp are dropped and counted.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_interactions(path: &Path) -> Result<(Vec<InteractionEvent>, InteractionLoadSummary)> {
    require_file(path)?;
    let mut reader = ReaderBuilder::new().has_headers(true).flexible(true).from_path(path)?;

    let mut summary = InteractionLoadSummary::default();
    let mut events = Vec::new();

    for result in reader.records() {
        let record = result?;
        summary.rows += 1;

        let Some(kind) = cell(&record, 2) else {
            summary.missing_interaction_type += 1;
            continue;
        };

        let Some(timestamp) = record.get(3).and_then(parse_timestamp) else {
            summary.unparseable_timestamp += 1;
            debug!("Unreadable timestamp in row {}", summary.rows);
            continue;
        };

        events.push(InteractionEvent {
            user_id: cell(&record, 0),
            product_id: cell(&record, 1),
            kind: InteractionKind::parse(&kind),
            timestamp,
        });
    }

    summary.loaded = events.len();
    if summary.unparseable_timestamp > 0 {
        warn!("Dropped {} events with unreadable timestamps", summary.unparseable_timestamp);
    }
    info!(
        "Loaded {} of {} interaction rows ({} without interaction type)",
        summary.loaded, summary.rows, summary.missing_interaction_type
    );
    AggregateMetrics::record_events_loaded(&summary);

    Ok((events, summary))
}
