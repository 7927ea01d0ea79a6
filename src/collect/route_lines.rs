use anyhow::Result;
use tracing::{debug, error, info};

use super::{Collector, SaveOutcome};
use crate::api::{Endpoint, RoutePointsRequest};
use crate::fetch::HttpClient;
use crate::pacer::Pacer;
use crate::parser::Route;
use crate::stats::CollectionStats;
use crate::store::{Category, CompletionIndex};

impl<C: HttpClient, P: Pacer> Collector<C, P> {
    /// Fetches the point geometry of every route that has no
    /// `routelines/<routeNo>.json` yet. One pass; failures are retried on the
    /// next run.
    #[tracing::instrument(skip_all, fields(routes = routes.len()))]
    pub async fn route_lines(&self, routes: &[Route]) -> Result<CollectionStats> {
        info!("Fetching routelines");
        let category = Category::RouteLines;
        let dir = self.store.dir(category);
        let done = CompletionIndex::scan(&dir)?;
        let pending = done.pending(routes, |r| r.route_no().to_string());

        let mut stats = CollectionStats::new(category);
        stats.skipped = routes.len() - pending.len();

        for route in pending {
            let route_no = route.route_no();
            debug!(route_no, "Fetching route points");
            stats.attempted += 1;

            match self
                .fetch_and_save(Endpoint::RoutePoints, &RoutePointsRequest::new(route), &dir, route_no)
                .await
            {
                Ok(SaveOutcome::Saved) => {
                    stats.saved += 1;
                    info!(route_no, "Fetched route points");
                }
                Ok(SaveOutcome::Rejected(status)) => {
                    stats.failed += 1;
                    error!(route_no, %status, "Failed to fetch route points");
                }
                Err(e) => {
                    stats.failed += 1;
                    error!(route_no, error = %format!("{e:#}"), "Failed to fetch route points");
                }
            }
        }

        stats.on_disk = CompletionIndex::scan(&dir)?.len();
        info!(
            saved = stats.saved,
            failed = stats.failed,
            on_disk = stats.on_disk,
            "Finished fetching routelines"
        );
        Ok(stats)
    }
}
