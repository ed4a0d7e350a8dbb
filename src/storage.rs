//! Record source abstraction.
//!
//! A [`RecordSource`] stands in for whatever external store or ingestion feed
//! delivers crash events and road features. The engine only reads complete
//! batches from it; failures are surfaced as [`RoadRiskError::Source`] and are
//! never retried here.

use crate::error::{Result, RoadRiskError};
use roadrisk_types::event::PointEvent;
use roadrisk_types::feature::LineFeature;
use std::path::{Path, PathBuf};

/// Trait for record source implementations
pub trait RecordSource: Send + Sync {
    /// Load the full current batch of events
    fn load_events(&self) -> Result<Vec<PointEvent>>;

    /// Load the full current batch of features
    fn load_features(&self) -> Result<Vec<LineFeature>>;

    /// Short name used in log messages
    fn name(&self) -> &str {
        "source"
    }
}

/// In-memory record source. Every load returns a copy of the held records.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    events: Vec<PointEvent>,
    features: Vec<LineFeature>,
}

impl MemorySource {
    pub fn new(events: Vec<PointEvent>, features: Vec<LineFeature>) -> Self {
        Self { events, features }
    }

    /// Replace the held events; the next load returns them.
    pub fn set_events(&mut self, events: Vec<PointEvent>) {
        self.events = events;
    }

    pub fn set_features(&mut self, features: Vec<LineFeature>) {
        self.features = features;
    }
}

impl RecordSource for MemorySource {
    fn load_events(&self) -> Result<Vec<PointEvent>> {
        Ok(self.events.clone())
    }

    fn load_features(&self) -> Result<Vec<LineFeature>> {
        Ok(self.features.clone())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Records stored as two JSON files: an array of events and an array of features.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    events_path: PathBuf,
    features_path: PathBuf,
}

impl JsonFileSource {
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(events_path: P, features_path: Q) -> Self {
        Self {
            events_path: events_path.into(),
            features_path: features_path.into(),
        }
    }

    fn read(path: &Path) -> Result<String> {
        std::fs::read_to_string(path)
            .map_err(|e| RoadRiskError::Source(format!("Failed to read {}: {}", path.display(), e)))
    }
}

impl RecordSource for JsonFileSource {
    fn load_events(&self) -> Result<Vec<PointEvent>> {
        let events: Vec<PointEvent> = serde_json::from_str(&Self::read(&self.events_path)?)?;
        log::debug!("Read {} events from {}", events.len(), self.events_path.display());
        Ok(events)
    }

    fn load_features(&self) -> Result<Vec<LineFeature>> {
        let features: Vec<LineFeature> = serde_json::from_str(&Self::read(&self.features_path)?)?;
        log::debug!(
            "Read {} features from {}",
            features.len(),
            self.features_path.display()
        );
        Ok(features)
    }

    fn name(&self) -> &str {
        "json-file"
    }
}
