//! Parsers for the upstream JSON documents the collectors read back.
//!
//! Artifacts are stored verbatim; only the handful of fields the drivers need
//! to make decisions are deserialized here. Everything else is ignored.

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use std::path::Path;

use crate::error::ScrapeError;

/// One entry of the route list (`routes.json`).
#[derive(Debug, Clone, Deserialize)]
pub struct Route {
    #[serde(deserialize_with = "number_or_string")]
    pub routeid: i64,
    pub routeno: String,
    #[serde(default, deserialize_with = "optional_number_or_string")]
    pub fromstationid: Option<i64>,
    #[serde(default, deserialize_with = "optional_number_or_string")]
    pub tostationid: Option<i64>,
}

impl Route {
    /// The route number used as the artifact key.
    pub fn route_no(&self) -> &str {
        self.routeno.trim()
    }

    pub fn family(&self) -> String {
        route_family(self.route_no())
    }

    /// First three characters of the route number, the granularity the
    /// route-search endpoint is queried at.
    pub fn prefix(&self) -> String {
        self.route_no().chars().take(3).collect()
    }
}

/// Strips the " UP" / " DOWN" direction marker from a route number.
pub fn route_family(route_no: &str) -> String {
    route_no.replace(" UP", "").replace(" DOWN", "")
}

/// The `routes.json` document.
#[derive(Debug, Deserialize)]
pub struct RouteList {
    #[serde(default)]
    pub data: Vec<Route>,
}

pub fn parse_route_list(bytes: &[u8]) -> Result<RouteList> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Reads and parses a previously fetched `routes.json`.
///
/// # Errors
///
/// Returns [`ScrapeError::MissingRouteList`] if the file does not exist, or a
/// parse error if it is not a route list.
pub fn load_route_list(path: &Path) -> Result<RouteList> {
    if !path.exists() {
        return Err(ScrapeError::MissingRouteList(path.to_path_buf()).into());
    }
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    parse_route_list(&bytes).with_context(|| format!("parsing {}", path.display()))
}

/// A `SearchRoute_v2` response as saved under `routeids/`.
#[derive(Debug, Deserialize)]
pub struct RouteSearchPage {
    #[serde(default)]
    pub data: Vec<RouteSearchHit>,
}

/// One search result. Some hits come back with a `null` parent id.
#[derive(Debug, Deserialize)]
pub struct RouteSearchHit {
    pub routeno: String,
    #[serde(default, deserialize_with = "optional_number_or_string")]
    pub routeparentid: Option<i64>,
}

pub const DATA_NOT_FOUND: &str = "Data not found";

/// A `SearchByRouteDetails_v4` response.
#[derive(Debug, Default, Deserialize)]
pub struct RouteDetails {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub up: Option<DirectionStops>,
    #[serde(default)]
    pub down: Option<DirectionStops>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DirectionStops {
    #[serde(default)]
    pub data: Option<Vec<serde_json::Value>>,
}

impl DirectionStops {
    fn is_empty(&self) -> bool {
        self.data.as_ref().is_none_or(Vec::is_empty)
    }
}

impl RouteDetails {
    pub fn is_data_not_found(&self) -> bool {
        self.message.as_deref() == Some(DATA_NOT_FOUND)
    }

    pub fn has_up(&self) -> bool {
        self.up.as_ref().is_some_and(|d| !d.is_empty())
    }

    pub fn has_down(&self) -> bool {
        self.down.as_ref().is_some_and(|d| !d.is_empty())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

impl RawId {
    fn into_i64<E: serde::de::Error>(self) -> Result<i64, E> {
        match self {
            RawId::Number(n) => Ok(n),
            RawId::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("expected a numeric id, got {s:?}"))),
        }
    }
}

// Upstream ids are integers, but some exports quote them.
fn number_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    RawId::deserialize(deserializer)?.into_i64()
}

fn optional_number_or_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<i64>, D::Error> {
    Option::<RawId>::deserialize(deserializer)?
        .map(RawId::into_i64)
        .transpose()
}
