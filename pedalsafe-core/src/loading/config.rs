use std::path::PathBuf;

use serde::Deserialize;

/// Planar radius (degrees) around an accident in which lanes are considered
pub const DEFAULT_ACCIDENT_BUFFER: f64 = 0.005;

/// Configuration for building a bike lane network
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    /// Bike lanes CSV with `lane_number`, `geometry` (WKT) and optional `count`
    pub lanes_path: PathBuf,
    /// Accidents CSV with `longitude` and `latitude`. When set, accident
    /// counts are recomputed from it instead of read from the lanes file.
    #[serde(default)]
    pub accidents_path: Option<PathBuf>,
    #[serde(default = "default_accident_buffer")]
    pub accident_buffer: f64,
}

impl NetworkConfig {
    pub fn new(lanes_path: impl Into<PathBuf>) -> Self {
        NetworkConfig {
            lanes_path: lanes_path.into(),
            accidents_path: None,
            accident_buffer: DEFAULT_ACCIDENT_BUFFER,
        }
    }

    #[must_use]
    pub fn with_accidents(mut self, accidents_path: impl Into<PathBuf>) -> Self {
        self.accidents_path = Some(accidents_path.into());
        self
    }
}

fn default_accident_buffer() -> f64 {
    DEFAULT_ACCIDENT_BUFFER
}
