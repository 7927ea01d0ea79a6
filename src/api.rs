//! Endpoints and request payloads of the BMTC web API.
//!
//! Field names and endpoint paths are the upstream contract and must match
//! verbatim, including the mixed casing of the timetable request.

use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::fetch::{ApiResponse, HttpClient, post_bytes, post_json};
use crate::parser::Route;

pub const DEFAULT_BASE_URL: &str = "https://bmtcmobileapistaging.amnex.com/WebAPI";

/// The upstream endpoints the collectors talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    RouteList,
    RoutePoints,
    Timetable,
    RouteSearch,
    RouteDetails,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::RouteList => "GetAllRouteList",
            Endpoint::RoutePoints => "RoutePoints",
            Endpoint::Timetable => "GetTimetableByRouteid_v3",
            Endpoint::RouteSearch => "SearchRoute_v2",
            Endpoint::RouteDetails => "SearchByRouteDetails_v4",
        }
    }
}

/// The BMTC API bound to a base URL and an [`HttpClient`].
pub struct TransitApi<C> {
    client: C,
    base_url: String,
}

impl<C: HttpClient> TransitApi<C> {
    pub fn new(client: C, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self, endpoint: Endpoint) -> String {
        format!("{}/{}", self.base_url, endpoint.path())
    }

    /// POSTs `payload` as JSON to `endpoint`.
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        endpoint: Endpoint,
        payload: &B,
    ) -> Result<ApiResponse> {
        let url = self.url(endpoint);
        debug!(%url, "POST");
        post_json(&self.client, &url, payload).await
    }

    /// POSTs to `endpoint` without a body.
    pub async fn post_empty(&self, endpoint: Endpoint) -> Result<ApiResponse> {
        let url = self.url(endpoint);
        debug!(%url, "POST (empty body)");
        post_bytes(&self.client, &url, None).await
    }
}

#[derive(Debug, Serialize)]
pub struct RoutePointsRequest {
    pub routeid: i64,
}

impl RoutePointsRequest {
    pub fn new(route: &Route) -> Self {
        Self {
            routeid: route.routeid,
        }
    }
}

/// Timetable query covering one whole service day.
#[derive(Debug, Serialize)]
pub struct TimetableRequest {
    pub routeid: i64,
    #[serde(rename = "fromStationId")]
    pub from_station_id: Option<i64>,
    #[serde(rename = "toStationId")]
    pub to_station_id: Option<i64>,
    pub current_date: String,
    pub endtime: String,
    pub starttime: String,
}

impl TimetableRequest {
    pub fn new(route: &Route, date: NaiveDate) -> Self {
        let day = date.format("%Y-%m-%d");
        Self {
            routeid: route.routeid,
            from_station_id: route.fromstationid,
            to_station_id: route.tostationid,
            current_date: format!("{day}T00:00:00.000Z"),
            endtime: format!("{day} 23:59"),
            starttime: format!("{day} 00:00"),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RouteSearchRequest<'a> {
    pub routetext: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RouteDetailsRequest {
    pub routeid: i64,
    pub servicetypeid: i64,
}

impl RouteDetailsRequest {
    pub fn new(route_parent_id: i64) -> Self {
        Self {
            routeid: route_parent_id,
            servicetypeid: 0,
        }
    }
}
