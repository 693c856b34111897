use std::{io, path::PathBuf};

use thiserror::Error;

mod loader;
pub mod models;
pub use loader::*;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Could not find street resource: {0}")]
    ResourceNotFound(PathBuf),
}

/// Names the decoded street resource and the city it describes.
pub struct Config {
    pub path: PathBuf,
    pub city_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: "nyc.json".into(),
            city_name: "New York".into(),
        }
    }
}
