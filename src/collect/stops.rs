use anyhow::{Context, Result};
use reqwest::StatusCode;
use std::path::Path;
use tracing::{debug, error, info, warn};

use super::{Collector, RouteFamilyMap};
use crate::api::{Endpoint, RouteDetailsRequest};
use crate::fetch::HttpClient;
use crate::pacer::Pacer;
use crate::parser::{Route, RouteDetails, route_family};
use crate::stats::{CollectionStats, StopListStats};
use crate::store::{Category, CompletionIndex, write_artifact};

/// Upper bound on passes over the pending stop-list routes.
pub const MAX_STOP_LIST_PASSES: usize = 99;

#[derive(Debug, Clone, PartialEq, Eq)]
enum StopListOutcome {
    /// The response had stops; `up`/`down` tell which files were newly written.
    Saved { up: bool, down: bool },
    /// Upstream answered "Data not found".
    NotFound,
    /// 200 with neither direction populated.
    Empty,
    Rejected(StatusCode),
}

impl<C: HttpClient, P: Pacer> Collector<C, P> {
    /// Fetches stop lists for every route without a `stops/<routeNo>.json`.
    ///
    /// Pending routes are processed in reverse route-list order and retried
    /// over up to [`MAX_STOP_LIST_PASSES`] passes. A route leaves the pending
    /// list once a response has stops in either direction or the upstream
    /// reports "Data not found"; anything else keeps it for the next pass. The
    /// directory is listed once, before the first pass; files written during
    /// the loop are added to that index, so a route whose direction was saved
    /// by its sibling's response is skipped without a request.
    #[tracing::instrument(skip_all, fields(routes = routes.len(), families = families.len()))]
    pub async fn stop_lists(
        &self,
        routes: &[Route],
        families: &RouteFamilyMap,
    ) -> Result<StopListStats> {
        info!("Fetching stoplists");
        let category = Category::Stops;
        let dir = self.store.dir(category);
        let mut done = CompletionIndex::scan(&dir)?;

        let mut pending: Vec<String> = done
            .pending(routes, |r| r.route_no().to_string())
            .into_iter()
            .rev()
            .map(|r| r.route_no().to_string())
            .collect();

        let mut stats = StopListStats {
            collection: CollectionStats::new(category),
            ..Default::default()
        };
        stats.collection.skipped = routes.len() - pending.len();

        for pass in 1..=MAX_STOP_LIST_PASSES {
            if pending.is_empty() {
                break;
            }
            stats.passes = pass;
            debug!(pass, pending = pending.len(), "Stop list pass");

            let round = pending.clone();
            for route_no in round.iter().map(String::as_str) {
                if done.contains(route_no) {
                    stats.collection.skipped += 1;
                    remove_first(&mut pending, route_no);
                    debug!(route_no, "Stop list already saved this run");
                    continue;
                }
                stats.collection.attempted += 1;

                match self
                    .fetch_stop_list(route_no, families, &dir, &mut done)
                    .await
                {
                    Ok(StopListOutcome::Saved { up, down }) => {
                        stats.collection.saved += usize::from(up) + usize::from(down);
                        remove_first(&mut pending, route_no);
                        info!(route_no, up, down, "Fetched stop list");
                    }
                    Ok(StopListOutcome::NotFound) => {
                        stats.dropped += 1;
                        remove_first(&mut pending, route_no);
                        info!(route_no, "No stop data upstream, dropping");
                    }
                    Ok(StopListOutcome::Empty) => {
                        stats.collection.failed += 1;
                        warn!(route_no, "Stop list response had no stops in either direction");
                    }
                    Ok(StopListOutcome::Rejected(status)) => {
                        stats.collection.failed += 1;
                        error!(route_no, %status, "Failed to fetch stop list");
                    }
                    Err(e) => {
                        stats.collection.failed += 1;
                        error!(route_no, error = ?e, "Failed to fetch stop list");
                    }
                }
            }
        }

        stats.remaining = pending.len();
        stats.collection.on_disk = CompletionIndex::scan(&dir)?.len();
        info!(
            passes = stats.passes,
            remaining = stats.remaining,
            dropped = stats.dropped,
            on_disk = stats.collection.on_disk,
            "Finished fetching stoplists"
        );
        Ok(stats)
    }

    async fn fetch_stop_list(
        &self,
        route_no: &str,
        families: &RouteFamilyMap,
        dir: &Path,
        done: &mut CompletionIndex,
    ) -> Result<StopListOutcome> {
        self.pacer.wait().await;

        let family = route_family(route_no);
        let parent_id = families.parent_id(&family)?;
        debug!(route_no, family = %family, parent_id, "Fetching stop list");

        let resp = self
            .api
            .post(Endpoint::RouteDetails, &RouteDetailsRequest::new(parent_id))
            .await?;
        if !resp.is_ok() {
            return Ok(StopListOutcome::Rejected(resp.status));
        }

        let details: RouteDetails = resp
            .json()
            .with_context(|| format!("parsing route details for {family}"))?;
        if details.is_data_not_found() {
            return Ok(StopListOutcome::NotFound);
        }

        // One detail response carries both directions of the family.
        if !details.has_up() && !details.has_down() {
            return Ok(StopListOutcome::Empty);
        }
        let up =
            details.has_up() && save_direction(dir, done, &format!("{family} UP"), &resp.body)?;
        let down =
            details.has_down() && save_direction(dir, done, &format!("{family} DOWN"), &resp.body)?;

        Ok(StopListOutcome::Saved { up, down })
    }
}

/// Writes one direction file unless it is already complete. Returns whether a
/// file was written.
fn save_direction(
    dir: &Path,
    done: &mut CompletionIndex,
    key: &str,
    body: &[u8],
) -> Result<bool> {
    if done.contains(key) {
        return Ok(false);
    }
    write_artifact(dir, key, body)?;
    done.insert(key);
    Ok(true)
}

fn remove_first(pending: &mut Vec<String>, route_no: &str) {
    if let Some(pos) = pending.iter().position(|r| r == route_no) {
        pending.remove(pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_first_keeps_later_duplicates() {
        let mut pending = vec!["A".to_string(), "B".to_string(), "A".to_string()];
        remove_first(&mut pending, "A");
        assert_eq!(pending, vec!["B", "A"]);

        remove_first(&mut pending, "missing");
        assert_eq!(pending.len(), 2);
    }

    #[test]
    fn test_save_direction_never_rewrites_a_saved_file() {
        let tmp = tempfile::tempdir().unwrap();
        let mut done = CompletionIndex::scan(tmp.path()).unwrap();

        assert!(save_direction(tmp.path(), &mut done, "500-D UP", b"first").unwrap());
        assert!(done.contains("500-D UP"));
        assert!(!save_direction(tmp.path(), &mut done, "500-D UP", b"second").unwrap());

        let saved = std::fs::read_to_string(tmp.path().join("500-D UP.json")).unwrap();
        assert_eq!(saved, "first");
    }
}
