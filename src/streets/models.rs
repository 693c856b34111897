use serde::Deserialize;

/// Raw street record as it appears in the decoded resource. Records missing
/// `id` or `name` fail to deserialize and are skipped by the loader.
#[derive(Debug, Deserialize)]
pub struct RawStreet {
    pub id: String,
    pub name: String,
    pub county: Option<String>,
    /// Left undecoded here so one malformed segment drops only itself, not
    /// the whole street.
    #[serde(default)]
    pub segments: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct RawSegment {
    pub id: String,
    /// `[lon, lat]` pairs; entries with fewer than two numbers are dropped,
    /// extra elements are ignored.
    #[serde(default)]
    pub coordinates: Vec<Vec<f64>>,
}
