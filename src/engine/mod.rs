use std::sync::Arc;

use chrono::Utc;
use rayon::prelude::*;
use tracing::{debug, trace};

mod distance;
mod filter;
pub mod proximity;
pub use distance::*;
pub use filter::*;

use crate::{
    location::LocationProvider,
    model::{City, Street},
    shared::{Coordinate, Distance},
    store::CompletionStore,
    streets::{self, StreetSource},
};

/// What changed, delivered to subscribers once per mutating call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// Cities were (re)loaded and every derived view was reset.
    Loaded,
    /// Segment completion changed, through a fix or a manual toggle.
    Completion,
}

/// The single owner of the city/street/segment graph.
///
/// Every mutation funnels through `&mut self`, so serializing access to one
/// engine value serializes the whole graph and its store writes. Fixes from
/// an asynchronous provider are marshaled by the embedding, for example by
/// sending them over a channel into the task that owns the engine.
pub struct Engine<S: CompletionStore> {
    cities: Vec<City>,
    store: S,
    selected_city: usize,
    county_filter: Option<Arc<str>>,
    search_text: String,
    distances: DistanceIndex,
    filters: FilterCache,
    observers: Vec<Box<dyn FnMut(Change) + Send>>,
}

impl<S: CompletionStore> Engine<S> {
    pub fn new(store: S) -> Self {
        Self {
            cities: Vec::new(),
            store,
            selected_city: 0,
            county_filter: None,
            search_text: String::new(),
            distances: DistanceIndex::new(),
            filters: FilterCache::new(),
            observers: Vec::new(),
        }
    }

    /// Loads the street resource, overlays persisted completion state and
    /// starts a fresh location epoch.
    ///
    /// On `ResourceNotFound` the caller is expected to substitute an empty
    /// city rather than treat the engine as broken.
    pub fn load_cities(&mut self, source: &StreetSource) -> Result<(), streets::Error> {
        let cities = source.load()?;
        self.cities = cities
            .into_iter()
            .map(|city| City::new(city.name.clone(), self.store.bulk_overlay(&city.streets)))
            .collect();
        if self.selected_city >= self.cities.len() {
            self.selected_city = 0;
        }
        self.distances.reset();
        self.filters.invalidate();
        self.notify(Change::Loaded);
        Ok(())
    }

    /// Applies one position fix: every not-yet-completed segment within the
    /// completion threshold is marked walked and written through the store.
    ///
    /// The scan covers all eligible segments before returning, so one fix at
    /// a junction can complete several segments at once. Already-completed
    /// segments are skipped, which makes repeated fixes at the same spot
    /// no-ops. Returns whether anything changed; at most one cache
    /// invalidation and one notification happen per call.
    pub fn apply_fix(&mut self, fix: Coordinate) -> bool {
        let now = Utc::now();
        let mut changed = false;

        for city in &mut self.cities {
            for street in &mut city.streets {
                let hits: Vec<usize> = street
                    .segments
                    .par_iter()
                    .enumerate()
                    .filter(|(_, segment)| {
                        !segment.is_completed()
                            && proximity::is_within(&fix, segment, proximity::COMPLETION_THRESHOLD)
                    })
                    .map(|(index, _)| index)
                    .collect();

                for index in hits {
                    let segment = &mut street.segments[index];
                    segment.set_completion(true, Some(now));
                    self.store.set(&segment.id, true, Some(now));
                    trace!("Completed segment {} of {}", segment.id, street.name);
                    changed = true;
                }
            }
        }

        if changed {
            debug!("Fix at {fix} completed new segments");
            self.filters.invalidate();
            self.notify(Change::Completion);
        }
        changed
    }

    /// Flips a street between fully completed and fully cleared.
    ///
    /// All-or-nothing: every segment of the street ends up in the same
    /// state, written through the store, with a single invalidation for the
    /// whole call. A street with no segments (or an unknown id) is a no-op.
    pub fn toggle(&mut self, street_id: &str) {
        let now = Utc::now();
        let mut changed = false;

        for city in &mut self.cities {
            let Some(street) = city
                .streets
                .iter_mut()
                .find(|street| street.id.as_ref() == street_id)
            else {
                continue;
            };
            if street.segments.is_empty() {
                continue;
            }

            let target = !street.is_completed();
            let completed_at = target.then_some(now);
            for segment in &mut street.segments {
                segment.set_completion(target, completed_at);
                self.store.set(&segment.id, target, completed_at);
            }
            debug!("Toggled {} to completed={target}", street.name);
            changed = true;
        }

        if changed {
            self.filters.invalidate();
            self.notify(Change::Completion);
        }
    }

    /// Feeds a fix to the distance index (first usable fix of the epoch
    /// populates it) and then applies it. Returns whether completion changed.
    pub fn observe_fix(&mut self, fix: Coordinate) -> bool {
        if let Some(city) = self.cities.get(self.selected_city)
            && self.distances.observe(&fix, city)
        {
            self.filters.invalidate();
        }
        self.apply_fix(fix)
    }

    /// Pulls the latest fix from a provider, gated on its tracking signal.
    pub fn poll_provider(&mut self, provider: &dyn LocationProvider) -> bool {
        if !provider.tracking_permitted() {
            return false;
        }
        match provider.latest_fix() {
            Some(fix) => self.observe_fix(fix),
            None => false,
        }
    }

    /// Explicitly starts a new location epoch; the next fix recomputes all
    /// street distances.
    pub fn reset_distances(&mut self) {
        self.distances.reset();
        self.filters.invalidate();
    }

    /// Distance from the last epoch fix to the given street, if computed.
    pub fn street_distance(&self, street_id: &str) -> Option<Distance> {
        self.distances.get(street_id)
    }

    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    pub fn active_city(&self) -> Option<&City> {
        self.cities.get(self.selected_city)
    }

    pub fn selected_city(&self) -> usize {
        self.selected_city
    }

    /// Selecting a city re-keys the filter views. It does not start a new
    /// location epoch; only loading and `reset_distances` do.
    pub fn select_city(&mut self, index: usize) {
        if index < self.cities.len() {
            self.selected_city = index;
        }
    }

    pub fn set_county_filter(&mut self, county: Option<Arc<str>>) {
        self.county_filter = county;
    }

    pub fn set_search_text(&mut self, search: impl Into<String>) {
        self.search_text = search.into();
    }

    /// Sorted unique counties of the active city.
    pub fn counties(&self) -> Vec<Arc<str>> {
        let Some(city) = self.active_city() else {
            return Vec::new();
        };
        let mut counties: Vec<Arc<str>> = city
            .streets
            .iter()
            .filter_map(|street| street.county.clone())
            .collect();
        counties.sort();
        counties.dedup();
        counties
    }

    /// The filtered street list for the current key, sorted by distance when
    /// an epoch has computed one, served from cache when the key is
    /// unchanged.
    pub fn filtered_streets(&mut self) -> &[Street] {
        self.ensure_views();
        self.filters.filtered()
    }

    pub fn completed_streets(&mut self) -> &[Street] {
        self.ensure_views();
        self.filters.completed()
    }

    pub fn incomplete_streets(&mut self) -> &[Street] {
        self.ensure_views();
        self.filters.incomplete()
    }

    pub fn completed_count(&mut self) -> usize {
        self.completed_streets().len()
    }

    pub fn total_filtered(&mut self) -> usize {
        self.filtered_streets().len()
    }

    /// Registers a change observer, called once per mutating call that
    /// actually changed state.
    pub fn subscribe(&mut self, observer: impl FnMut(Change) + Send + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn ensure_views(&mut self) {
        let key = FilterKey {
            city_index: self.selected_city,
            county: self.county_filter.clone(),
            search: self.search_text.clone(),
        };
        self.filters
            .ensure(&key, self.cities.get(self.selected_city), &self.distances);
    }

    fn notify(&mut self, change: Change) {
        for observer in &mut self.observers {
            observer(change);
        }
    }
}
