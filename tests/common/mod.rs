#![allow(dead_code)]

use bmtc_scraper::api::TransitApi;
use bmtc_scraper::collect::Collector;
use bmtc_scraper::fetch::{BasicClient, BrowserHeaders};
use bmtc_scraper::pacer::InstantPacer;
use bmtc_scraper::parser::{Route, parse_route_list};
use bmtc_scraper::store::ArtifactStore;
use std::path::Path;
use wiremock::MockServer;

pub type TestCollector = Collector<BrowserHeaders<BasicClient>, InstantPacer>;

/// A collector pointed at the mock server, writing under `dir`, without pacing.
pub fn collector(server: &MockServer, dir: &Path) -> TestCollector {
    Collector::new(
        TransitApi::new(BrowserHeaders::new(BasicClient::new()), &server.uri()),
        InstantPacer,
        ArtifactStore::new(dir),
    )
}

pub fn routes(json: &str) -> Vec<Route> {
    parse_route_list(json.as_bytes()).unwrap().data
}

pub fn read(path: impl AsRef<Path>) -> String {
    std::fs::read_to_string(path).unwrap()
}

pub fn file_names(dir: impl AsRef<Path>) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
