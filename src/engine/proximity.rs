use crate::{
    model::Segment,
    shared::{Coordinate, Distance},
};

/// How close a fix has to come to a segment vertex to count as walked.
pub const COMPLETION_THRESHOLD: Distance = Distance::from_meters(20.0);

/// True when the fix is within `threshold` of any vertex of the segment's
/// polyline.
///
/// This is a nearest-vertex test, not a nearest-point-on-line test. At
/// pedestrian speeds and typical vertex density that is accurate enough and
/// much cheaper; the known trade-off is that a long straight segment with
/// sparse vertices can under-detect near its midpoint.
pub fn is_within(fix: &Coordinate, segment: &Segment, threshold: Distance) -> bool {
    segment
        .coordinates
        .iter()
        .any(|coordinate| coordinate.distance(fix) <= threshold)
}

#[cfg(test)]
fn segment_at(longitude: f64, latitude: f64) -> Segment {
    Segment::new("seg", vec![Coordinate::new(longitude, latitude)])
}

#[test]
fn fix_on_vertex_is_within() {
    let segment = segment_at(-73.99, 40.73);
    let fix = Coordinate::new(-73.99, 40.73);
    assert!(is_within(&fix, &segment, COMPLETION_THRESHOLD));
}

#[test]
fn fix_ten_meters_away_is_within() {
    let segment = segment_at(-73.99, 40.73);
    // Roughly 10 m north.
    let fix = Coordinate::new(-73.99, 40.73009);
    assert!(is_within(&fix, &segment, COMPLETION_THRESHOLD));
}

#[test]
fn fix_hundred_meters_away_is_not_within() {
    let segment = segment_at(-73.99, 40.73);
    // Roughly 110 m north.
    let fix = Coordinate::new(-73.99, 40.731);
    assert!(!is_within(&fix, &segment, COMPLETION_THRESHOLD));
}

#[test]
fn empty_segment_never_matches() {
    let segment = Segment::new("seg", Vec::new());
    let fix = Coordinate::new(-73.99, 40.73);
    assert!(!is_within(&fix, &segment, COMPLETION_THRESHOLD));
}
