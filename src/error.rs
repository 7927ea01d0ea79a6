//! Domain errors callers may want to match on.
//!
//! Everything else flows through [`anyhow::Error`] with context attached.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The orchestrator needs a route list fetched by an earlier `routes` run.
    #[error("route list not found at {0}; fetch it first with the `routes` command")]
    MissingRouteList(PathBuf),

    /// No route-search result mapped this family to a parent id.
    #[error("no route parent id known for route family {0:?}")]
    UnknownRouteFamily(String),
}
