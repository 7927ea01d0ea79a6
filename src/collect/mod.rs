//! Collection drivers.
//!
//! A [`Collector`] owns everything a driver needs (the API client, the pacer
//! and the artifact store) and exposes one method per data category. Drivers
//! snapshot a [`CompletionIndex`](crate::store::CompletionIndex) for their
//! directory, request only what is missing and log failures without stopping.

mod route_ids;
mod route_lines;
mod routes;
mod stops;
mod timetables;

pub use route_ids::RouteFamilyMap;
pub use stops::MAX_STOP_LIST_PASSES;
pub use timetables::{candidate_dates, collection_dates};

use anyhow::Result;
use chrono::{Local, Utc};
use reqwest::StatusCode;
use serde::Serialize;
use std::path::Path;
use tracing::info;

use crate::api::{Endpoint, TransitApi};
use crate::config::ScraperConfig;
use crate::fetch::{BasicClient, BrowserHeaders, HttpClient};
use crate::pacer::{JitterPacer, Pacer};
use crate::parser::load_route_list;
use crate::stats::RunReport;
use crate::store::{ArtifactStore, write_artifact};

pub struct Collector<C, P> {
    api: TransitApi<C>,
    pacer: P,
    store: ArtifactStore,
}

impl Collector<BrowserHeaders<BasicClient>, JitterPacer> {
    /// The production collector: reqwest with portal headers and jittered pacing.
    pub fn from_config(config: &ScraperConfig) -> Self {
        Self::new(
            TransitApi::new(BrowserHeaders::new(BasicClient::new()), &config.base_url),
            JitterPacer::new(config.min_delay, config.max_delay),
            ArtifactStore::new(&config.data_dir),
        )
    }
}

/// Result of a single fetch-and-save attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SaveOutcome {
    Saved,
    Rejected(StatusCode),
}

impl<C: HttpClient, P: Pacer> Collector<C, P> {
    pub fn new(api: TransitApi<C>, pacer: P, store: ArtifactStore) -> Self {
        Self { api, pacer, store }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Paces, POSTs `payload` and writes the body to `<dir>/<key>.json` on 200.
    pub(crate) async fn fetch_and_save<B: Serialize + Sync + ?Sized>(
        &self,
        endpoint: Endpoint,
        payload: &B,
        dir: &Path,
        key: &str,
    ) -> Result<SaveOutcome> {
        self.pacer.wait().await;
        let resp = self.api.post(endpoint, payload).await?;
        if !resp.is_ok() {
            return Ok(SaveOutcome::Rejected(resp.status));
        }
        write_artifact(dir, key, &resp.body)?;
        Ok(SaveOutcome::Saved)
    }

    /// Loads `routes.json` and runs every driver in order: route ids, route
    /// lines, timetables, stop lists.
    ///
    /// # Errors
    ///
    /// Fails if `routes.json` is missing or malformed, if a category directory
    /// cannot be created, or if a saved route-search page cannot be parsed.
    /// Per-item request failures are logged and counted, never returned.
    pub async fn run_all(&self) -> Result<RunReport> {
        let started_at = Utc::now();
        let route_list = load_route_list(&self.store.route_list_path())?;
        let routes = route_list.data;
        info!(routes = routes.len(), "Route list loaded");

        let (families, route_ids) = self.route_ids(&routes).await?;
        let route_lines = self.route_lines(&routes).await?;
        let timetables = self
            .timetables(&routes, Local::now().date_naive())
            .await?;
        let stop_lists = self.stop_lists(&routes, &families).await?;

        Ok(RunReport {
            started_at,
            finished_at: Utc::now(),
            routes: routes.len(),
            route_families: families.len(),
            route_ids,
            route_lines,
            timetables,
            stop_lists,
        })
    }
}
