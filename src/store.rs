//! On-disk artifact layout and the completion index.
//!
//! An artifact is the raw body of one upstream response stored as
//! `<category dir>/<key>.json`. The presence of that file is the only
//! completion marker; files are never rewritten or removed once created.

use anyhow::{Context, Result};
use chrono::Weekday;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const FILE_EXTENSION: &str = ".json";
pub const ROUTE_LIST_KEY: &str = "routes";

/// The artifact categories and the directory each one lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Routes,
    RouteLines,
    Timetables(Weekday),
    RouteIds,
    Stops,
}

impl Category {
    /// Directory relative to the data root.
    pub fn relative_dir(&self) -> PathBuf {
        match self {
            Category::Routes => PathBuf::new(),
            Category::RouteLines => PathBuf::from("routelines"),
            Category::Timetables(day) => Path::new("timetables").join(weekday_name(*day)),
            Category::RouteIds => PathBuf::from("routeids"),
            Category::Stops => PathBuf::from("stops"),
        }
    }

    pub fn name(&self) -> String {
        match self {
            Category::Routes => "routes".to_string(),
            Category::RouteLines => "routelines".to_string(),
            Category::Timetables(day) => format!("timetables/{}", weekday_name(*day)),
            Category::RouteIds => "routeids".to_string(),
            Category::Stops => "stops".to_string(),
        }
    }
}

/// Full English weekday name, as used for timetable directories.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Root of the artifact tree.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dir(&self, category: Category) -> PathBuf {
        self.root.join(category.relative_dir())
    }

    pub fn route_list_path(&self) -> PathBuf {
        artifact_path(&self.root, ROUTE_LIST_KEY)
    }
}

pub fn artifact_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{key}{FILE_EXTENSION}"))
}

/// Writes `body` to `<dir>/<key>.json`, creating `dir` if needed.
///
/// The body goes to a hidden temporary file first and is renamed into place,
/// so an interrupted write never looks like a completed artifact.
pub fn write_artifact(dir: &Path, key: &str, body: &[u8]) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = artifact_path(dir, key);
    let tmp = dir.join(format!(".{key}{FILE_EXTENSION}.tmp"));

    fs::write(&tmp, body).with_context(|| format!("writing {}", tmp.display()))?;
    fs::rename(&tmp, &path).with_context(|| format!("renaming into {}", path.display()))?;

    debug!(path = %path.display(), bytes = body.len(), "Artifact written");
    Ok(path)
}

/// The set of keys that already have an artifact in one category directory.
///
/// Built from a directory listing at a checkpoint and never re-read behind the
/// caller's back. Callers that write during a run `insert` what they wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionIndex {
    keys: BTreeSet<String>,
}

impl CompletionIndex {
    /// Snapshots the `*.json` files in `dir`, creating the directory if needed.
    pub fn scan(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

        let mut keys = BTreeSet::new();
        for entry in fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(key) = entry
                .file_name()
                .to_str()
                .and_then(|name| name.strip_suffix(FILE_EXTENSION))
            {
                keys.insert(key.to_string());
            }
        }

        debug!(dir = %dir.display(), count = keys.len(), "Completion index scanned");
        Ok(Self { keys })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn insert(&mut self, key: impl Into<String>) -> bool {
        self.keys.insert(key.into())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Items whose key is not yet in the index, in input order.
    pub fn pending<'a, T, F>(&self, items: &'a [T], key: F) -> Vec<&'a T>
    where
        F: Fn(&T) -> String,
    {
        items
            .iter()
            .filter(|&item| !self.contains(&key(item)))
            .collect()
    }
}
