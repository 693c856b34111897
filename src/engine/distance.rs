use std::{collections::HashMap, sync::Arc, time::Instant};

use rayon::prelude::*;
use tracing::debug;

use crate::{
    model::City,
    shared::{Coordinate, Distance},
};

/// Per-street distance to the user, computed at most once per location epoch.
///
/// An epoch starts at city (re)load or an explicit [`reset`](Self::reset);
/// the first fix of the epoch populates the index and later fixes are
/// ignored. That keeps the O(total coordinates) scan off the hot fix path at
/// the cost of distance ordering going stale as the user moves within an
/// epoch. Streets without geometry get infinity so they sort last.
#[derive(Debug, Default)]
pub struct DistanceIndex {
    distances: HashMap<Arc<str>, Distance>,
    computed: bool,
}

impl DistanceIndex {
    pub fn new() -> Self {
        Default::default()
    }

    /// Populates the index from the given fix if this epoch has not computed
    /// yet. Returns whether a computation ran.
    pub fn observe(&mut self, fix: &Coordinate, city: &City) -> bool {
        if self.computed || city.streets.is_empty() {
            return false;
        }

        let now = Instant::now();
        self.distances = city
            .streets
            .par_iter()
            .map(|street| (street.id.clone(), street.min_distance_to(fix)))
            .collect();
        self.computed = true;
        debug!(
            "Computed {} street distances in {:?}",
            self.distances.len(),
            now.elapsed()
        );
        true
    }

    /// Starts a new epoch; the next fix recomputes every distance.
    pub fn reset(&mut self) {
        self.distances.clear();
        self.computed = false;
    }

    pub fn get(&self, street_id: &str) -> Option<Distance> {
        self.distances.get(street_id).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    pub fn len(&self) -> usize {
        self.distances.len()
    }
}
