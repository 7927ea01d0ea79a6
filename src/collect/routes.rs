use anyhow::Result;
use tracing::{error, info};

use super::Collector;
use crate::api::Endpoint;
use crate::fetch::{ApiResponse, HttpClient};
use crate::pacer::Pacer;
use crate::store::{ROUTE_LIST_KEY, write_artifact};

impl<C: HttpClient, P: Pacer> Collector<C, P> {
    /// Fetches the full route list and stores it verbatim as `routes.json`.
    ///
    /// The response is returned either way; on a non-200 status nothing is
    /// written and the caller decides what to do.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_routes(&self) -> Result<ApiResponse> {
        self.pacer.wait().await;
        let resp = self.api.post_empty(Endpoint::RouteList).await?;

        if resp.is_ok() {
            let path = write_artifact(self.store.root(), ROUTE_LIST_KEY, &resp.body)?;
            info!(path = %path.display(), bytes = resp.body.len(), "Route list saved");
        } else {
            error!(status = %resp.status, "Failed to fetch routes");
        }

        Ok(resp)
    }
}
