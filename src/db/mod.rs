//! Cached record set with spatial indexes.
//!
//! This module defines [`Store`], which owns the crash events and road
//! features an analysis runs against. Each record's geometry and its index box
//! are written and removed together, so a query never sees one without the
//! other.

use crate::compute::geometry::{line_bbox, point_bbox};
use crate::compute::spatial::SpatialIndex;
use crate::compute::validation::{validate_event, validate_feature};
use crate::config::Config;
use crate::error::{Result, RoadRiskError};
use roadrisk_types::bbox::BoundingBox2D;
use roadrisk_types::event::PointEvent;
use roadrisk_types::feature::LineFeature;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

mod analysis;
mod window;

#[cfg(feature = "sync")]
mod sync;

pub use window::EventFilter;

#[cfg(feature = "sync")]
pub use sync::SyncStore;

/// In-memory record set of point events and line features.
///
/// `Store` is a plain single-threaded value; wrap it in [`SyncStore`] (with
/// the `sync` feature) to share a read-mostly snapshot between threads.
///
/// Events are kept ordered by id. Features keep their insertion order, which
/// is the order used for assignment tie-breaks and for summary rows.
///
/// # Examples
///
/// ```rust
/// use roadrisk::{Store, QueryShape};
/// use roadrisk_types::event::PointEvent;
/// use roadrisk_types::feature::LineFeature;
/// use geo::line_string;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut store = Store::new();
/// store.insert_feature(LineFeature::new(1, "arterial", line_string![(x: 0.0, y: 0.0), (x: 1000.0, y: 0.0)]))?;
/// store.insert_event(PointEvent::at(7, 3, 500.0, 10.0))?;
///
/// let hits = store.query_window(&QueryShape::rect(0.0, 0.0, 600.0, 600.0)?)?;
/// assert_eq!(hits, vec![7]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Store {
    pub(crate) config: Config,
    pub(crate) events: BTreeMap<u64, PointEvent>,
    pub(crate) event_index: SpatialIndex,
    pub(crate) features: Vec<LineFeature>,
    /// Feature id to position in `features`
    pub(crate) feature_positions: FxHashMap<u64, usize>,
    pub(crate) feature_index: SpatialIndex,
}

impl Store {
    /// Empty store with the default configuration.
    pub fn new() -> Self {
        Self::empty(Config::default())
    }

    /// Empty store with a custom configuration.
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().map_err(RoadRiskError::Config)?;
        Ok(Self::empty(config))
    }

    fn empty(config: Config) -> Self {
        Self {
            config,
            events: BTreeMap::new(),
            event_index: SpatialIndex::new(),
            features: Vec::new(),
            feature_positions: FxHashMap::default(),
            feature_index: SpatialIndex::new(),
        }
    }

    /// Build a store from complete record batches, bulk loading both indexes.
    ///
    /// Every record is validated before anything is built. A repeated event id
    /// keeps the last event; a repeated feature id keeps the last geometry at
    /// the position of the first occurrence.
    ///
    /// # Errors
    ///
    /// `Config` for an invalid configuration, `InvalidInput` for the first
    /// record with invalid geometry.
    pub fn from_records(
        config: Config,
        events: Vec<PointEvent>,
        features: Vec<LineFeature>,
    ) -> Result<Self> {
        config.validate().map_err(RoadRiskError::Config)?;
        for event in &events {
            validate_event(event)?;
        }
        for feature in &features {
            validate_feature(feature)?;
        }

        let mut event_map = BTreeMap::new();
        for event in events {
            event_map.insert(event.id, event);
        }

        let mut ordered: Vec<LineFeature> = Vec::with_capacity(features.len());
        let mut positions: FxHashMap<u64, usize> = FxHashMap::default();
        for feature in features {
            match positions.get(&feature.id()) {
                Some(&pos) => ordered[pos] = feature,
                None => {
                    positions.insert(feature.id(), ordered.len());
                    ordered.push(feature);
                }
            }
        }

        let event_index = SpatialIndex::bulk_load(
            event_map
                .values()
                .map(|event| (event.id, point_bbox(&event.geometry))),
        );
        let feature_index = SpatialIndex::bulk_load(
            ordered
                .iter()
                .filter_map(|feature| line_bbox(feature.geometry()).map(|bbox| (feature.id(), bbox))),
        );

        log::info!(
            "Loaded store with {} events and {} features",
            event_map.len(),
            ordered.len()
        );

        Ok(Self {
            config,
            events: event_map,
            event_index,
            features: ordered,
            feature_positions: positions,
            feature_index,
        })
    }

    /// Replace every record at once, keeping the current configuration.
    ///
    /// The new record set is built completely before the old one is dropped;
    /// on error the store is unchanged.
    pub fn replace_all(&mut self, events: Vec<PointEvent>, features: Vec<LineFeature>) -> Result<()> {
        let next = Self::from_records(self.config.clone(), events, features)?;
        *self = next;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Insert or replace an event. Returns the replaced event, if any.
    pub fn insert_event(&mut self, event: PointEvent) -> Result<Option<PointEvent>> {
        validate_event(&event)?;
        self.event_index.insert(event.id, point_bbox(&event.geometry));
        Ok(self.events.insert(event.id, event))
    }

    /// Remove an event and its index entry.
    pub fn delete_event(&mut self, id: u64) -> Option<PointEvent> {
        let removed = self.events.remove(&id)?;
        self.event_index.delete(id);
        Some(removed)
    }

    pub fn get_event(&self, id: u64) -> Result<&PointEvent> {
        self.events.get(&id).ok_or(RoadRiskError::RecordNotFound(id))
    }

    /// Events in ascending id order.
    pub fn events(&self) -> impl Iterator<Item = &PointEvent> {
        self.events.values()
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Insert or replace a feature.
    ///
    /// A new feature goes to the end of the feature order; a replacement keeps
    /// the position of the feature it replaces.
    pub fn insert_feature(&mut self, feature: LineFeature) -> Result<Option<LineFeature>> {
        validate_feature(&feature)?;
        let bbox = line_bbox(feature.geometry()).ok_or_else(|| {
            RoadRiskError::InvalidInput(format!("Feature {} has no vertices", feature.id()))
        })?;

        self.feature_index.insert(feature.id(), bbox);
        match self.feature_positions.get(&feature.id()) {
            Some(&pos) => Ok(Some(std::mem::replace(&mut self.features[pos], feature))),
            None => {
                self.feature_positions.insert(feature.id(), self.features.len());
                self.features.push(feature);
                Ok(None)
            }
        }
    }

    /// Remove a feature and its index entry. Later features shift up one position.
    pub fn delete_feature(&mut self, id: u64) -> Option<LineFeature> {
        let pos = self.feature_positions.remove(&id)?;
        self.feature_index.delete(id);
        let removed = self.features.remove(pos);
        for (offset, feature) in self.features[pos..].iter().enumerate() {
            self.feature_positions.insert(feature.id(), pos + offset);
        }
        Some(removed)
    }

    pub fn get_feature(&self, id: u64) -> Result<&LineFeature> {
        self.feature_positions
            .get(&id)
            .map(|&pos| &self.features[pos])
            .ok_or(RoadRiskError::RecordNotFound(id))
    }

    /// Features in insertion order.
    pub fn features(&self) -> &[LineFeature] {
        &self.features
    }

    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    /// Remove every record. The configuration is kept.
    pub fn clear(&mut self) {
        self.events.clear();
        self.event_index.clear();
        self.features.clear();
        self.feature_positions.clear();
        self.feature_index.clear();
    }

    /// Get store statistics
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            event_count: self.events.len(),
            feature_count: self.features.len(),
            event_extent: self.event_index.stats().extent,
            feature_extent: self.feature_index.stats().extent,
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

/// Record counts and extents of a [`Store`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreStats {
    pub event_count: usize,
    pub feature_count: usize,
    pub event_extent: Option<BoundingBox2D>,
    pub feature_extent: Option<BoundingBox2D>,
}
