use strider::streets::{Config, Error, StreetSource};

fn fixture_source() -> StreetSource {
    let path = format!("{}/tests/fixtures/streets.json", env!("CARGO_MANIFEST_DIR"));
    StreetSource::new(Config {
        path: path.into(),
        city_name: "New York".into(),
    })
}

#[test]
fn loads_well_formed_streets() {
    let cities = fixture_source().load().unwrap();
    assert_eq!(cities.len(), 1);

    let city = &cities[0];
    assert_eq!(city.name.as_ref(), "New York");
    assert_eq!(city.total_streets(), 3);

    let elm = &city.streets[0];
    assert_eq!(elm.name.as_ref(), "Elm Street");
    assert_eq!(elm.normalized_name.as_ref(), "elm street");
    assert_eq!(elm.county.as_deref(), Some("Kings"));
    assert_eq!(elm.segments.len(), 2);
    assert_eq!(elm.segments[0].coordinates.len(), 2);
}

#[test]
fn skips_records_without_id_or_name() {
    let cities = fixture_source().load().unwrap();
    let names: Vec<_> = cities[0]
        .streets
        .iter()
        .map(|street| street.name.to_string())
        .collect();
    assert_eq!(names, vec!["Elm Street", "Oak Avenue", "Bare Road"]);
}

#[test]
fn skips_malformed_segments_and_coordinates() {
    let cities = fixture_source().load().unwrap();
    let bare = &cities[0].streets[2];

    // The id-less segment is dropped; the surviving one keeps only the
    // coordinate with at least two numbers, extra elements ignored.
    assert_eq!(bare.segments.len(), 1);
    assert_eq!(bare.segments[0].id.as_ref(), "st-4-a");
    assert_eq!(bare.segments[0].coordinates.len(), 1);
    assert_eq!(bare.segments[0].coordinates[0].longitude, -73.92);
    assert_eq!(bare.segments[0].coordinates[0].latitude, 40.77);
}

#[test]
fn missing_resource_is_a_distinct_error() {
    let source = StreetSource::new(Config {
        path: "does-not-exist.json".into(),
        city_name: "New York".into(),
    });
    match source.load() {
        Err(Error::ResourceNotFound(path)) => {
            assert_eq!(path, std::path::PathBuf::from("does-not-exist.json"))
        }
        other => panic!("expected ResourceNotFound, got {other:?}"),
    }
}

#[test]
fn document_that_is_not_an_array_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("streets.json");
    std::fs::write(&path, "{\"not\": \"an array\"}").unwrap();

    let source = StreetSource::new(Config {
        path,
        city_name: "New York".into(),
    });
    assert!(matches!(source.load(), Err(Error::Json(_))));
}

#[test]
fn loaded_streets_carry_no_completion() {
    let cities = fixture_source().load().unwrap();
    for street in &cities[0].streets {
        assert!(!street.is_completed());
        for segment in &street.segments {
            assert!(!segment.is_completed());
            assert!(segment.completed_date().is_none());
        }
    }
}
