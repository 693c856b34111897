use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::shared::{Coordinate, Distance};

/// One walkable stretch of a street, a polyline of coordinates.
///
/// Completion lives here and nowhere else; streets and cities only derive
/// from it. The two completion fields are private so that a completed
/// segment always carries a date and an uncompleted one never does.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Segment {
    pub id: Arc<str>,
    pub coordinates: Vec<Coordinate>,
    is_completed: bool,
    completed_date: Option<DateTime<Utc>>,
}

impl Segment {
    pub fn new(id: impl Into<Arc<str>>, coordinates: Vec<Coordinate>) -> Self {
        Self {
            id: id.into(),
            coordinates,
            is_completed: false,
            completed_date: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.is_completed
    }

    pub fn completed_date(&self) -> Option<DateTime<Utc>> {
        self.completed_date
    }

    /// Clearing completion always clears the date as well.
    pub fn set_completion(&mut self, completed: bool, completed_at: Option<DateTime<Utc>>) {
        self.is_completed = completed;
        self.completed_date = if completed { completed_at } else { None };
    }

    /// Smallest great-circle distance from any vertex to the given point,
    /// infinity for a segment without geometry.
    pub fn min_distance_to(&self, point: &Coordinate) -> Distance {
        self.coordinates
            .iter()
            .map(|coordinate| coordinate.distance(point))
            .min_by(Distance::total_cmp)
            .unwrap_or(Distance::INFINITY)
    }
}

/// A named street owning its segments. Everything completion-related is
/// computed from the segments on every read, never cached on the street.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Street {
    pub id: Arc<str>,
    pub name: Arc<str>,
    pub normalized_name: Arc<str>,
    pub county: Option<Arc<str>>,
    pub segments: Vec<Segment>,
}

impl Street {
    pub fn new(
        id: impl Into<Arc<str>>,
        name: impl Into<Arc<str>>,
        county: Option<Arc<str>>,
        segments: Vec<Segment>,
    ) -> Self {
        let name = name.into();
        let normalized_name = name.to_lowercase().into();
        Self {
            id: id.into(),
            name,
            normalized_name,
            county,
            segments,
        }
    }

    /// A street with no segments is never completed.
    pub fn is_completed(&self) -> bool {
        !self.segments.is_empty() && self.segments.iter().all(Segment::is_completed)
    }

    /// The most recent segment completion, if any segment carries one.
    pub fn completed_date(&self) -> Option<DateTime<Utc>> {
        self.segments
            .iter()
            .filter_map(Segment::completed_date)
            .max()
    }

    pub fn completion_progress(&self) -> f64 {
        if self.segments.is_empty() {
            return 0.0;
        }
        let completed = self
            .segments
            .iter()
            .filter(|segment| segment.is_completed())
            .count();
        completed as f64 / self.segments.len() as f64
    }

    pub fn is_partially_completed(&self) -> bool {
        !self.is_completed() && self.completion_progress() > 0.0
    }

    /// Smallest vertex distance across all segments, infinity for a street
    /// without geometry.
    pub fn min_distance_to(&self, point: &Coordinate) -> Distance {
        self.segments
            .iter()
            .map(|segment| segment.min_distance_to(point))
            .min_by(Distance::total_cmp)
            .unwrap_or(Distance::INFINITY)
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct City {
    pub name: Arc<str>,
    pub streets: Vec<Street>,
    total_streets: usize,
}

impl City {
    /// Snapshots the street count at construction. The snapshot is kept as a
    /// stable progress denominator even if the street list changes later.
    pub fn new(name: impl Into<Arc<str>>, streets: Vec<Street>) -> Self {
        let total_streets = streets.len();
        Self {
            name: name.into(),
            streets,
            total_streets,
        }
    }

    pub fn total_streets(&self) -> usize {
        self.total_streets
    }

    pub fn completed_count(&self) -> usize {
        self.streets
            .iter()
            .filter(|street| street.is_completed())
            .count()
    }
}

#[test]
fn street_with_no_segments_is_not_completed() {
    let street = Street::new("s1", "Elm Street", None, Vec::new());
    assert!(!street.is_completed());
    assert_eq!(street.completion_progress(), 0.0);
}

#[test]
fn clearing_completion_clears_date() {
    let mut segment = Segment::new("seg1", Vec::new());
    segment.set_completion(true, Some(Utc::now()));
    assert!(segment.is_completed());
    assert!(segment.completed_date().is_some());

    segment.set_completion(false, Some(Utc::now()));
    assert!(!segment.is_completed());
    assert!(segment.completed_date().is_none());
}

#[test]
fn two_of_three_segments_is_partial() {
    let now = Utc::now();
    let mut segments = vec![
        Segment::new("seg1", Vec::new()),
        Segment::new("seg2", Vec::new()),
        Segment::new("seg3", Vec::new()),
    ];
    segments[0].set_completion(true, Some(now));
    segments[1].set_completion(true, Some(now));

    let street = Street::new("s1", "Elm Street", None, segments);
    assert!(!street.is_completed());
    assert!(street.is_partially_completed());
    assert_eq!(street.completion_progress(), 2.0 / 3.0);
}

#[test]
fn completed_date_is_latest_segment_date() {
    use chrono::TimeZone;

    let earlier = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
    let later = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();

    let mut first = Segment::new("seg1", Vec::new());
    first.set_completion(true, Some(later));
    let mut second = Segment::new("seg2", Vec::new());
    second.set_completion(true, Some(earlier));

    let street = Street::new("s1", "Elm Street", None, vec![first, second]);
    assert!(street.is_completed());
    assert_eq!(street.completed_date(), Some(later));
}
