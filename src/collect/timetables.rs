use anyhow::Result;
use chrono::{Datelike, Days, NaiveDate, Weekday};
use tracing::{debug, error, info};

use super::{Collector, SaveOutcome};
use crate::api::{Endpoint, TimetableRequest};
use crate::fetch::HttpClient;
use crate::pacer::Pacer;
use crate::parser::Route;
use crate::stats::CollectionStats;
use crate::store::{Category, CompletionIndex};

/// The only weekday timetables are collected for.
pub const COLLECTED_WEEKDAY: Weekday = Weekday::Mon;

/// The seven calendar days after `today`.
pub fn candidate_dates(today: NaiveDate) -> Vec<NaiveDate> {
    (1..=7)
        .filter_map(|offset| today.checked_add_days(Days::new(offset)))
        .collect()
}

/// The candidate dates timetables are fetched for: the next Monday only.
pub fn collection_dates(today: NaiveDate) -> Vec<NaiveDate> {
    candidate_dates(today)
        .into_iter()
        .filter(|date| date.weekday() == COLLECTED_WEEKDAY)
        .collect()
}

impl<C: HttpClient, P: Pacer> Collector<C, P> {
    /// Fetches the next Monday's timetable for every route that has no
    /// `timetables/Monday/<routeNo>.json` yet. One pass.
    #[tracing::instrument(skip_all, fields(routes = routes.len(), today = %today))]
    pub async fn timetables(
        &self,
        routes: &[Route],
        today: NaiveDate,
    ) -> Result<Vec<CollectionStats>> {
        info!("Fetching timetables");
        let mut all_stats = Vec::new();

        for date in collection_dates(today) {
            let category = Category::Timetables(date.weekday());
            let dir = self.store.dir(category);
            let done = CompletionIndex::scan(&dir)?;
            let pending = done.pending(routes, |r| r.route_no().to_string());

            let mut stats = CollectionStats::new(category);
            stats.skipped = routes.len() - pending.len();

            for route in pending {
                let route_no = route.route_no();
                debug!(route_no, %date, "Fetching timetable");
                stats.attempted += 1;

                let request = TimetableRequest::new(route, date);
                match self
                    .fetch_and_save(Endpoint::Timetable, &request, &dir, route_no)
                    .await
                {
                    Ok(SaveOutcome::Saved) => {
                        stats.saved += 1;
                        info!(route_no, "Fetched timetable");
                    }
                    Ok(SaveOutcome::Rejected(status)) => {
                        stats.failed += 1;
                        error!(route_no, %status, "Failed to fetch timetable");
                    }
                    Err(e) => {
                        stats.failed += 1;
                        error!(route_no, error = %format!("{e:#}"), "Failed to fetch timetable");
                    }
                }
            }

            stats.on_disk = CompletionIndex::scan(&dir)?.len();
            info!(
                %date,
                saved = stats.saved,
                failed = stats.failed,
                on_disk = stats.on_disk,
                "Finished fetching timetables"
            );
            all_stats.push(stats);
        }

        Ok(all_stats)
    }
}
