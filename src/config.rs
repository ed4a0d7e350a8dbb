//! Engine configuration.
//!
//! Defaults follow the reference crash-analysis workload: an 80 m search
//! radius for road assignment, 20 hotspots over 10 fixed k-means rounds and a
//! 30-day trailing window for time series.
use crate::compute::validation::MAX_WINDOW_DAYS;
use crate::error::{Result, RoadRiskError};
use serde::de::Error;
use std::path::Path;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Maximum event-to-feature distance for assignment, in meters
    #[serde(default = "Config::default_search_radius")]
    pub search_radius: f64,

    /// Default number of hotspots requested from k-means
    #[serde(default = "Config::default_cluster_count")]
    pub cluster_count: usize,

    /// Fixed number of k-means rounds (no convergence check)
    #[serde(default = "Config::default_cluster_iterations")]
    pub cluster_iterations: usize,

    /// Seed for centroid initialization
    #[serde(default = "Config::default_cluster_seed")]
    pub cluster_seed: u64,

    /// Length of the trailing window for time series, in days
    #[serde(default = "Config::default_window_days")]
    pub window_days: u32,

    /// Radius used for point queries when the caller gives none, in meters
    #[serde(default = "Config::default_point_radius")]
    pub default_point_radius: f64,

    /// Vertex count of the polygon approximating a point+radius query
    #[serde(default = "Config::default_circle_segments")]
    pub circle_segments: usize,
}

impl Config {
    const fn default_search_radius() -> f64 {
        80.0
    }

    const fn default_cluster_count() -> usize {
        20
    }

    const fn default_cluster_iterations() -> usize {
        10
    }

    const fn default_cluster_seed() -> u64 {
        42
    }

    const fn default_window_days() -> u32 {
        30
    }

    const fn default_point_radius() -> f64 {
        250.0
    }

    const fn default_circle_segments() -> usize {
        64
    }

    pub fn with_search_radius(mut self, radius: f64) -> Self {
        self.search_radius = radius;
        self
    }

    pub fn with_cluster_count(mut self, k: usize) -> Self {
        assert!(k > 0, "Cluster count must be greater than zero");
        self.cluster_count = k;
        self
    }

    pub fn with_cluster_iterations(mut self, iterations: usize) -> Self {
        self.cluster_iterations = iterations;
        self
    }

    pub fn with_cluster_seed(mut self, seed: u64) -> Self {
        self.cluster_seed = seed;
        self
    }

    pub fn with_window_days(mut self, days: u32) -> Self {
        assert!(days > 0, "Window must span at least one day");
        self.window_days = days;
        self
    }

    pub fn with_default_point_radius(mut self, radius: f64) -> Self {
        self.default_point_radius = radius;
        self
    }

    pub fn with_circle_segments(mut self, segments: usize) -> Self {
        if segments > 4096 {
            log::warn!(
                "Circle approximation with {} vertices is very large; point queries will slow down",
                segments
            );
        }
        self.circle_segments = segments;
        self
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if !self.search_radius.is_finite() || self.search_radius < 0.0 {
            return Err(format!(
                "Search radius must be finite and non-negative, got: {}",
                self.search_radius
            ));
        }

        if self.cluster_count == 0 {
            return Err("Cluster count must be greater than zero".to_string());
        }

        if self.window_days == 0 || self.window_days > MAX_WINDOW_DAYS {
            return Err(format!(
                "Window must span 1..={} days, got: {}",
                MAX_WINDOW_DAYS, self.window_days
            ));
        }

        if !self.default_point_radius.is_finite() || self.default_point_radius <= 0.0 {
            return Err(format!(
                "Default point radius must be positive and finite, got: {}",
                self.default_point_radius
            ));
        }

        if self.circle_segments < 3 {
            return Err(format!(
                "Circle approximation needs at least 3 segments, got: {}",
                self.circle_segments
            ));
        }

        Ok(())
    }

    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        let config: Config = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(serde_json::Error::custom(e));
        }
        Ok(config)
    }

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> std::result::Result<Self, toml::de::Error> {
        let config: Config = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Load configuration from a file, choosing the format by extension.
    ///
    /// `.toml` files require the `toml` feature; everything else is read as JSON.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            RoadRiskError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let is_toml = path.extension().is_some_and(|ext| ext == "toml");
        if is_toml {
            #[cfg(feature = "toml")]
            {
                return Self::from_toml(&contents)
                    .map_err(|e| RoadRiskError::Config(e.to_string()));
            }
            #[cfg(not(feature = "toml"))]
            {
                return Err(RoadRiskError::Config(
                    "TOML configuration requires the `toml` feature".to_string(),
                ));
            }
        }

        Self::from_json(&contents).map_err(|e| RoadRiskError::Config(e.to_string()))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search_radius: Self::default_search_radius(),
            cluster_count: Self::default_cluster_count(),
            cluster_iterations: Self::default_cluster_iterations(),
            cluster_seed: Self::default_cluster_seed(),
            window_days: Self::default_window_days(),
            default_point_radius: Self::default_point_radius(),
            circle_segments: Self::default_circle_segments(),
        }
    }
}
