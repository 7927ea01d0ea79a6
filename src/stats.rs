//! Per-driver counters and the end-of-run report.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::store::Category;

/// What one collection driver did during a single pass over the route list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectionStats {
    pub category: String,
    /// Requests issued.
    pub attempted: usize,
    /// Artifacts written.
    pub saved: usize,
    /// Requests that produced no artifact (non-200, transport or parse failure).
    pub failed: usize,
    /// Items skipped because their artifact already existed.
    pub skipped: usize,
    /// Artifacts in the category directory once the driver finished.
    pub on_disk: usize,
}

impl CollectionStats {
    pub fn new(category: Category) -> Self {
        Self {
            category: category.name(),
            ..Default::default()
        }
    }
}

/// Stop-list counters; the driver retries over several passes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StopListStats {
    #[serde(flatten)]
    pub collection: CollectionStats,
    /// Routes the upstream answered "Data not found" for.
    pub dropped: usize,
    /// Routes still pending when the loop ended.
    pub remaining: usize,
    pub passes: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub routes: usize,
    pub route_families: usize,
    pub route_ids: CollectionStats,
    pub route_lines: CollectionStats,
    pub timetables: Vec<CollectionStats>,
    pub stop_lists: StopListStats,
}

/// Logs a report as pretty-printed JSON.
pub fn print_json<T: Serialize>(report: &T) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}
