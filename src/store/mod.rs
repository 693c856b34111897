use chrono::{DateTime, Utc};

mod file;
mod memory;
pub use file::*;
pub use memory::*;

use crate::model::Street;

/// Key-value persistence contract for segment completion state.
///
/// Missing data is never an error: an unknown segment id reads back as not
/// completed. Writes are idempotent, and clearing a segment removes both the
/// flag and any stored timestamp so uncompleted segments leave no residue.
pub trait CompletionStore {
    fn get(&self, segment_id: &str) -> (bool, Option<DateTime<Utc>>);

    fn set(&mut self, segment_id: &str, completed: bool, completed_at: Option<DateTime<Utc>>);

    /// Returns a copy of the given streets with every segment's completion
    /// fields replaced by the store's current values. Does not mutate the
    /// store.
    fn bulk_overlay(&self, streets: &[Street]) -> Vec<Street> {
        streets
            .iter()
            .map(|street| {
                let mut street = street.clone();
                for segment in &mut street.segments {
                    let (completed, completed_at) = self.get(&segment.id);
                    segment.set_completion(completed, completed_at);
                }
                street
            })
            .collect()
    }
}
