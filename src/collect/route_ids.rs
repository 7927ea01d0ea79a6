use anyhow::{Context, Result};
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;
use tracing::{debug, error, info};

use super::{Collector, SaveOutcome};
use crate::api::{Endpoint, RouteSearchRequest};
use crate::error::ScrapeError;
use crate::fetch::HttpClient;
use crate::pacer::Pacer;
use crate::parser::{Route, RouteSearchPage};
use crate::stats::CollectionStats;
use crate::store::{Category, CompletionIndex, FILE_EXTENSION};

/// Route family name → route parent id.
///
/// Built once per run from every page saved under `routeids/` and only read
/// afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteFamilyMap {
    parents: HashMap<String, i64>,
}

impl RouteFamilyMap {
    /// Merges every `*.json` route-search page in `dir`. Files are read in name
    /// order, so a family listed twice takes the id from the last file.
    pub fn scan(dir: &Path) -> Result<Self> {
        let mut paths: Vec<_> = fs::read_dir(dir)
            .with_context(|| format!("listing {}", dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_file()
                    && path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.ends_with(FILE_EXTENSION))
            })
            .collect();
        paths.sort();

        let mut map = Self::default();
        for path in paths {
            let bytes = fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
            let page: RouteSearchPage = serde_json::from_slice(&bytes)
                .with_context(|| format!("parsing route search page {}", path.display()))?;
            map.merge(page);
        }
        Ok(map)
    }

    /// Adds every hit that carries a parent id; hits without one are left out
    /// so their family stays unresolved.
    pub fn merge(&mut self, page: RouteSearchPage) {
        for hit in page.data {
            match hit.routeparentid {
                Some(id) => {
                    self.parents.insert(hit.routeno, id);
                }
                None => debug!(routeno = %hit.routeno, "Search hit has no route parent id"),
            }
        }
    }

    pub fn parent_id(&self, family: &str) -> Result<i64, ScrapeError> {
        self.parents
            .get(family)
            .copied()
            .ok_or_else(|| ScrapeError::UnknownRouteFamily(family.to_string()))
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }
}

impl FromIterator<(String, i64)> for RouteFamilyMap {
    fn from_iter<I: IntoIterator<Item = (String, i64)>>(iter: I) -> Self {
        Self {
            parents: iter.into_iter().collect(),
        }
    }
}

impl<C: HttpClient, P: Pacer> Collector<C, P> {
    /// Resolves route families to parent ids.
    ///
    /// Searches every 3-character route prefix that has no saved page yet,
    /// then rebuilds the map from all pages in `routeids/`, including ones
    /// saved by earlier runs.
    ///
    /// # Errors
    ///
    /// Fails if the directory cannot be read or a saved page is not valid
    /// JSON. Failed searches are only logged; their families stay unresolved.
    #[tracing::instrument(skip_all, fields(routes = routes.len()))]
    pub async fn route_ids(&self, routes: &[Route]) -> Result<(RouteFamilyMap, CollectionStats)> {
        info!("Fetching routeids");
        let category = Category::RouteIds;
        let dir = self.store.dir(category);
        let done = CompletionIndex::scan(&dir)?;

        // Pages are keyed by prefix, so a family name rarely matches here and
        // nearly every route contributes its prefix.
        let pending = done.pending(routes, Route::family);
        let prefixes: BTreeSet<String> = pending.iter().map(|r| r.prefix()).collect();

        let mut stats = CollectionStats::new(category);
        for prefix in &prefixes {
            if done.contains(prefix) {
                stats.skipped += 1;
                continue;
            }
            debug!(prefix = %prefix, "Searching routes");
            stats.attempted += 1;

            let request = RouteSearchRequest { routetext: prefix };
            match self
                .fetch_and_save(Endpoint::RouteSearch, &request, &dir, prefix)
                .await
            {
                Ok(SaveOutcome::Saved) => stats.saved += 1,
                Ok(SaveOutcome::Rejected(status)) => {
                    stats.failed += 1;
                    error!(prefix = %prefix, %status, "Failed to fetch route IDs");
                }
                Err(e) => {
                    stats.failed += 1;
                    error!(prefix = %prefix, error = %format!("{e:#}"), "Failed to fetch route IDs");
                }
            }
        }

        let map = RouteFamilyMap::scan(&dir)?;
        stats.on_disk = CompletionIndex::scan(&dir)?.len();
        info!(
            prefixes = prefixes.len(),
            families = map.len(),
            failed = stats.failed,
            "Finished fetching routeids"
        );
        Ok((map, stats))
    }
}
