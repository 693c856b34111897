use std::sync::Arc;

use tracing::debug;

use crate::{
    engine::DistanceIndex,
    model::{City, Street},
    shared::Distance,
};

/// Identifies one derived view of the street list.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FilterKey {
    pub city_index: usize,
    pub county: Option<Arc<str>>,
    pub search: String,
}

/// Cached filtered/sorted/partitioned views of the active city's streets.
///
/// A view is recomputed when the key changes or after an explicit
/// [`invalidate`](Self::invalidate). Validity is an explicit flag: a computed
/// view that happens to be empty stays valid and is served from cache, it is
/// never treated as "not yet computed".
#[derive(Debug, Default)]
pub struct FilterCache {
    key: Option<FilterKey>,
    valid: bool,
    filtered: Vec<Street>,
    completed: Vec<Street>,
    incomplete: Vec<Street>,
    computations: u64,
}

impl FilterCache {
    pub fn new() -> Self {
        Default::default()
    }

    /// Drops the current view; the next read recomputes.
    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    /// Makes sure the cached view matches the given key, recomputing if the
    /// key changed or the cache was invalidated.
    pub fn ensure(&mut self, key: &FilterKey, city: Option<&City>, distances: &DistanceIndex) {
        if self.valid && self.key.as_ref() == Some(key) {
            return;
        }
        self.recompute(key, city, distances);
    }

    pub fn filtered(&self) -> &[Street] {
        &self.filtered
    }

    pub fn completed(&self) -> &[Street] {
        &self.completed
    }

    pub fn incomplete(&self) -> &[Street] {
        &self.incomplete
    }

    /// How many times a view has been computed, for tests and tracing.
    pub(crate) fn computations(&self) -> u64 {
        self.computations
    }

    fn recompute(&mut self, key: &FilterKey, city: Option<&City>, distances: &DistanceIndex) {
        let mut streets: Vec<Street> = city.map(|city| city.streets.clone()).unwrap_or_default();

        if let Some(county) = &key.county {
            streets.retain(|street| street.county.as_deref() == Some(county.as_ref()));
        }

        if !key.search.is_empty() {
            let needle = key.search.to_lowercase();
            streets.retain(|street| street.normalized_name.contains(&needle));
        }

        // Stable sort: streets missing from the index share infinity and so
        // keep their prior relative order after all indexed ones.
        if !distances.is_empty() {
            streets.sort_by(|a, b| {
                let dist_a = distances.get(&a.id).unwrap_or(Distance::INFINITY);
                let dist_b = distances.get(&b.id).unwrap_or(Distance::INFINITY);
                dist_a.total_cmp(&dist_b)
            });
        }

        self.completed = streets
            .iter()
            .filter(|street| street.is_completed())
            .cloned()
            .collect();
        self.incomplete = streets
            .iter()
            .filter(|street| !street.is_completed())
            .cloned()
            .collect();
        self.filtered = streets;
        self.key = Some(key.clone());
        self.valid = true;
        self.computations += 1;
        debug!(
            "Recomputed filter view #{} ({} streets)",
            self.computations,
            self.filtered.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{model::Segment, shared::Coordinate};

    fn city() -> City {
        let elm = Street::new(
            "elm",
            "Elm",
            Some("Kings".into()),
            vec![Segment::new("e1", vec![Coordinate::new(-73.99, 40.73)])],
        );
        let oak = Street::new(
            "oak",
            "Oak",
            Some("Queens".into()),
            vec![Segment::new("o1", vec![Coordinate::new(-73.99, 40.74)])],
        );
        City::new("New York", vec![elm, oak])
    }

    fn key(search: &str) -> FilterKey {
        FilterKey {
            city_index: 0,
            county: None,
            search: search.into(),
        }
    }

    #[test]
    fn search_is_case_insensitive() {
        let mut cache = FilterCache::new();
        let city = city();
        cache.ensure(&key("el"), Some(&city), &DistanceIndex::new());
        let names: Vec<_> = cache.filtered().iter().map(|s| s.name.to_string()).collect();
        assert_eq!(names, vec!["Elm"]);
    }

    #[test]
    fn county_filter_is_exact() {
        let mut cache = FilterCache::new();
        let city = city();
        let key = FilterKey {
            city_index: 0,
            county: Some("Queens".into()),
            search: String::new(),
        };
        cache.ensure(&key, Some(&city), &DistanceIndex::new());
        let names: Vec<_> = cache.filtered().iter().map(|s| s.name.to_string()).collect();
        assert_eq!(names, vec!["Oak"]);
    }

    #[test]
    fn empty_result_stays_valid() {
        let mut cache = FilterCache::new();
        let city = city();
        let miss = key("xyz");
        cache.ensure(&miss, Some(&city), &DistanceIndex::new());
        assert!(cache.filtered().is_empty());
        assert_eq!(cache.computations(), 1);

        // Same key again: served from cache even though the view is empty.
        cache.ensure(&miss, Some(&city), &DistanceIndex::new());
        assert_eq!(cache.computations(), 1);
    }

    #[test]
    fn key_change_recomputes() {
        let mut cache = FilterCache::new();
        let city = city();
        cache.ensure(&key(""), Some(&city), &DistanceIndex::new());
        cache.ensure(&key("oak"), Some(&city), &DistanceIndex::new());
        assert_eq!(cache.computations(), 2);
        assert_eq!(cache.filtered().len(), 1);
    }

    #[test]
    fn invalidation_recomputes_same_key() {
        let mut cache = FilterCache::new();
        let city = city();
        cache.ensure(&key(""), Some(&city), &DistanceIndex::new());
        cache.invalidate();
        cache.ensure(&key(""), Some(&city), &DistanceIndex::new());
        assert_eq!(cache.computations(), 2);
    }

    #[test]
    fn distance_sort_puts_unindexed_streets_last() {
        let mut index = DistanceIndex::new();
        // Only Oak is close to the fix; Elm is indexed too but further out.
        let city = city();
        index.observe(&Coordinate::new(-73.99, 40.74), &city);

        let extra = Street::new("ash", "Ash", None, Vec::new());
        let mut streets = city.streets.clone();
        streets.insert(0, extra);
        let with_extra = City::new("New York", streets);

        let mut cache = FilterCache::new();
        cache.ensure(&key(""), Some(&with_extra), &index);
        let names: Vec<_> = cache.filtered().iter().map(|s| s.name.to_string()).collect();
        // Ash has no distance entry and no geometry, so it sorts after the
        // indexed streets despite coming first in the city list.
        assert_eq!(names, vec!["Oak", "Elm", "Ash"]);
    }

    #[test]
    fn partition_preserves_sorted_order() {
        let mut city = city();
        let now = chrono::Utc::now();
        for segment in &mut city.streets[1].segments {
            segment.set_completion(true, Some(now));
        }

        let mut cache = FilterCache::new();
        cache.ensure(&key(""), Some(&city), &DistanceIndex::new());
        assert_eq!(cache.completed().len(), 1);
        assert_eq!(cache.completed()[0].name.as_ref(), "Oak");
        assert_eq!(cache.incomplete().len(), 1);
        assert_eq!(cache.incomplete()[0].name.as_ref(), "Elm");
    }
}
