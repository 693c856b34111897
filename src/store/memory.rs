use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::store::CompletionStore;

/// In-process store. Presence in the map means completed; the value carries
/// the completion timestamp when one was recorded.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, Option<DateTime<Utc>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CompletionStore for MemoryStore {
    fn get(&self, segment_id: &str) -> (bool, Option<DateTime<Utc>>) {
        match self.entries.get(segment_id) {
            Some(completed_at) => (true, *completed_at),
            None => (false, None),
        }
    }

    fn set(&mut self, segment_id: &str, completed: bool, completed_at: Option<DateTime<Utc>>) {
        if completed {
            self.entries.insert(segment_id.to_string(), completed_at);
        } else {
            self.entries.remove(segment_id);
        }
    }
}

#[test]
fn unknown_segment_reads_not_completed() {
    let store = MemoryStore::new();
    assert_eq!(store.get("missing"), (false, None));
}

#[test]
fn clearing_removes_residue() {
    let mut store = MemoryStore::new();
    store.set("seg1", true, Some(Utc::now()));
    assert_eq!(store.len(), 1);

    store.set("seg1", false, None);
    assert!(store.is_empty());
    assert_eq!(store.get("seg1"), (false, None));
}
