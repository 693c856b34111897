use std::{fs, time::Instant};

use tracing::{debug, trace};

use crate::{
    model::{City, Segment, Street},
    shared::Coordinate,
    streets::{
        self, Config,
        models::{RawSegment, RawStreet},
    },
};

/// Loads the decoded street resource into model cities.
///
/// Parsing is lenient the whole way down: a record that fails to deserialize,
/// a segment without an id, or a coordinate with fewer than two numbers is
/// skipped and the load proceeds. Only a missing resource file or a document
/// that is not a JSON array surfaces as an error.
pub struct StreetSource {
    config: Config,
}

impl StreetSource {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Reads and decodes the resource. The result carries no completion
    /// state; the engine overlays that from its store.
    pub fn load(&self) -> Result<Vec<City>, streets::Error> {
        if !self.config.path.exists() {
            return Err(streets::Error::ResourceNotFound(self.config.path.clone()));
        }

        debug!("Loading streets from {:?}...", self.config.path);
        let now = Instant::now();
        let bytes = fs::read(&self.config.path)?;
        let records: Vec<serde_json::Value> = serde_json::from_slice(&bytes)?;
        let total = records.len();

        let streets: Vec<Street> = records
            .into_iter()
            .filter_map(|record| serde_json::from_value::<RawStreet>(record).ok())
            .map(into_street)
            .collect();

        if streets.len() < total {
            trace!("Skipped {} malformed street records", total - streets.len());
        }
        debug!(
            "Loaded {} streets for {} in {:?}",
            streets.len(),
            self.config.city_name,
            now.elapsed()
        );
        Ok(vec![City::new(self.config.city_name.as_str(), streets)])
    }
}

fn into_street(raw: RawStreet) -> Street {
    let segments = raw
        .segments
        .into_iter()
        .filter_map(|segment| serde_json::from_value::<RawSegment>(segment).ok())
        .map(|segment| {
            let coordinates = segment
                .coordinates
                .into_iter()
                .filter(|coordinate| coordinate.len() >= 2)
                .map(|coordinate| Coordinate::new(coordinate[0], coordinate[1]))
                .collect();
            Segment::new(segment.id, coordinates)
        })
        .collect();
    Street::new(raw.id, raw.name, raw.county.map(Into::into), segments)
}
