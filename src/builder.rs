//! Store builder for flexible configuration
//!
//! Collects configuration and initial records, then validates and bulk loads
//! everything in one step.

use crate::config::Config;
use crate::db::Store;
use crate::error::Result;
use crate::storage::RecordSource;
use roadrisk_types::event::PointEvent;
use roadrisk_types::feature::LineFeature;
use std::path::Path;

/// Builder for a [`Store`] with custom configuration and initial records.
#[derive(Debug, Default)]
pub struct StoreBuilder {
    config: Config,
    events: Vec<PointEvent>,
    features: Vec<LineFeature>,
}

impl StoreBuilder {
    /// Create a new builder with the default configuration and no records.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the engine configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Load the configuration from a JSON or TOML file.
    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        self.config = Config::load(path)?;
        Ok(self)
    }

    pub fn search_radius(mut self, radius: f64) -> Self {
        self.config = self.config.with_search_radius(radius);
        self
    }

    pub fn events<I: IntoIterator<Item = PointEvent>>(mut self, events: I) -> Self {
        self.events.extend(events);
        self
    }

    pub fn features<I: IntoIterator<Item = LineFeature>>(mut self, features: I) -> Self {
        self.features.extend(features);
        self
    }

    /// Append every record currently offered by `source`.
    pub fn source<S: RecordSource + ?Sized>(mut self, source: &S) -> Result<Self> {
        let events = source.load_events()?;
        let features = source.load_features()?;
        log::debug!(
            "Builder pulled {} events and {} features from {}",
            events.len(),
            features.len(),
            source.name()
        );
        self.events.extend(events);
        self.features.extend(features);
        Ok(self)
    }

    /// Build the store. Validates the configuration and every record.
    pub fn build(self) -> Result<Store> {
        Store::from_records(self.config, self.events, self.features)
    }

    /// Build a shared store for concurrent readers.
    #[cfg(feature = "sync")]
    pub fn build_sync(self) -> Result<crate::db::SyncStore> {
        Ok(crate::db::SyncStore::from_store(self.build()?))
    }
}
