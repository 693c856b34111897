use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::store::CompletionStore;

/// Completion store persisted as a single JSON object mapping segment id to
/// an optional Unix timestamp. Presence means completed.
///
/// Writes are best-effort: the whole snapshot is rewritten to a sibling temp
/// file and renamed into place, so a failed or interrupted write can lose the
/// latest flag but never corrupts the other entries. Failures are logged and
/// swallowed; reads always come from the in-memory map.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: HashMap<String, Option<i64>>,
}

impl JsonFileStore {
    /// Opens the store at the given path. A missing or unreadable snapshot
    /// starts the store empty rather than failing.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(entries) => entries,
                Err(error) => {
                    warn!("Discarding unreadable completion snapshot {path:?}: {error}");
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };
        debug!("Opened completion store {path:?} with {} entries", entries.len());
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn persist(&self) {
        let bytes = match serde_json::to_vec(&self.entries) {
            Ok(bytes) => bytes,
            Err(error) => {
                warn!("Could not serialize completion snapshot: {error}");
                return;
            }
        };
        let tmp = self.path.with_extension("tmp");
        if let Err(error) = fs::write(&tmp, bytes).and_then(|_| fs::rename(&tmp, &self.path)) {
            warn!("Could not persist completion snapshot {:?}: {error}", self.path);
        }
    }
}

impl CompletionStore for JsonFileStore {
    fn get(&self, segment_id: &str) -> (bool, Option<DateTime<Utc>>) {
        match self.entries.get(segment_id) {
            Some(seconds) => (
                true,
                seconds.and_then(|seconds| DateTime::from_timestamp(seconds, 0)),
            ),
            None => (false, None),
        }
    }

    fn set(&mut self, segment_id: &str, completed: bool, completed_at: Option<DateTime<Utc>>) {
        if completed {
            self.entries.insert(
                segment_id.to_string(),
                completed_at.map(|date| date.timestamp()),
            );
        } else {
            self.entries.remove(segment_id);
        }
        self.persist();
    }
}
