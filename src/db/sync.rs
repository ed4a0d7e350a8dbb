//! Thread-safe snapshot wrapper for concurrent readers.
//!
//! `SyncStore` holds an `Arc<RwLock<Arc<Store>>>`. Readers clone the inner
//! `Arc` and query it without holding the lock; a refresh builds a complete
//! new [`Store`] first and then swaps the pointer under a short write lock.
//! A reader therefore sees either the old record set or the new one, never a
//! mixture.
//!
//! # Examples
//!
//! ```rust
//! use roadrisk::{QueryShape, SyncStore};
//! use roadrisk_types::event::PointEvent;
//! use std::thread;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SyncStore::new();
//! store.refresh(vec![PointEvent::at(1, 3, 0.0, 0.0)], vec![])?;
//!
//! let reader = store.clone();
//! let handle = thread::spawn(move || {
//!     let shape = QueryShape::rect(-1.0, -1.0, 1.0, 1.0).unwrap();
//!     reader.query_window(&shape).unwrap()
//! });
//!
//! assert_eq!(handle.join().unwrap(), vec![1]);
//! # Ok(())
//! # }
//! ```

use super::{EventFilter, Store, StoreStats};
use crate::compute::window::QueryShape;
use crate::config::Config;
use crate::error::Result;
use crate::storage::RecordSource;
use chrono::NaiveDate;
use geo::Point;
use parking_lot::RwLock;
use roadrisk_types::analysis::{Assignment, Cluster, FeatureSummary};
use roadrisk_types::event::PointEvent;
use roadrisk_types::feature::LineFeature;
use roadrisk_types::window::{SeveritySummary, TimeSeries};
use std::sync::Arc;

/// Shared handle to an atomically replaceable [`Store`].
///
/// Cloning is cheap and every clone sees the same current snapshot.
#[derive(Debug, Clone)]
pub struct SyncStore {
    inner: Arc<RwLock<Arc<Store>>>,
}

impl SyncStore {
    /// Empty store with the default configuration.
    pub fn new() -> Self {
        Self::from_store(Store::new())
    }

    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self::from_store(Store::with_config(config)?))
    }

    pub fn from_store(store: Store) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(store))),
        }
    }

    /// Current snapshot. It stays valid after later refreshes.
    pub fn snapshot(&self) -> Arc<Store> {
        self.inner.read().clone()
    }

    /// Replace every record at once.
    ///
    /// The new store is built and validated outside the lock. On error the
    /// current snapshot stays in place.
    pub fn refresh(&self, events: Vec<PointEvent>, features: Vec<LineFeature>) -> Result<()> {
        let config = self.snapshot().config().clone();
        let next = Store::from_records(config, events, features)?;
        self.swap(next);
        Ok(())
    }

    /// Load fresh records from `source` and swap them in.
    ///
    /// Source errors are returned unchanged and leave the current snapshot in place.
    pub fn refresh_from<S: RecordSource + ?Sized>(&self, source: &S) -> Result<()> {
        let events = source.load_events()?;
        let features = source.load_features()?;
        self.refresh(events, features)
    }

    fn swap(&self, next: Store) {
        let (events, features) = (next.event_count(), next.feature_count());
        *self.inner.write() = Arc::new(next);
        log::info!(
            "Swapped in refreshed store with {} events and {} features",
            events,
            features
        );
    }

    // ===== Queries against the current snapshot =====

    pub fn query_window(&self, shape: &QueryShape) -> Result<Vec<u64>> {
        self.snapshot().query_window(shape)
    }

    pub fn query_point(&self, center: Point) -> Result<Vec<u64>> {
        self.snapshot().query_point(center)
    }

    pub fn query_window_candidates(&self, shape: &QueryShape) -> Result<Vec<u64>> {
        self.snapshot().query_window_candidates(shape)
    }

    pub fn query_feature_window(&self, shape: &QueryShape) -> Result<Vec<u64>> {
        self.snapshot().query_feature_window(shape)
    }

    pub fn events_in(&self, shape: &QueryShape, filter: &EventFilter) -> Result<Vec<PointEvent>> {
        self.snapshot().events_in(shape, filter)
    }

    pub fn time_series(
        &self,
        shape: &QueryShape,
        today: NaiveDate,
        window_days: u32,
    ) -> Result<TimeSeries> {
        self.snapshot().time_series(shape, today, window_days)
    }

    pub fn time_series_default(&self, shape: &QueryShape) -> Result<TimeSeries> {
        self.snapshot().time_series_default(shape)
    }

    pub fn severity_histogram(&self, shape: &QueryShape) -> Result<SeveritySummary> {
        self.snapshot().severity_histogram(shape)
    }

    pub fn hotspots(&self, shape: &QueryShape, filter: &EventFilter, k: usize) -> Result<Vec<Cluster>> {
        self.snapshot().hotspots(shape, filter, k)
    }

    pub fn assign_nearest(&self) -> Result<Vec<Assignment>> {
        self.snapshot().assign_nearest()
    }

    pub fn road_summary(&self) -> Result<Vec<FeatureSummary>> {
        self.snapshot().road_summary()
    }

    pub fn stats(&self) -> StoreStats {
        self.snapshot().stats()
    }
}

impl Default for SyncStore {
    fn default() -> Self {
        Self::new()
    }
}
