//! Embedded spatial engine for road-crash assignment, risk scoring, hotspots
//! and windowed analytics.
//!
//! ```rust
//! use roadrisk::{QueryShape, StoreBuilder};
//! use roadrisk_types::event::PointEvent;
//! use roadrisk_types::feature::LineFeature;
//! use geo::line_string;
//!
//! let store = StoreBuilder::new()
//!     .features(vec![LineFeature::new(1, "arterial", line_string![(x: 0.0, y: 0.0), (x: 1000.0, y: 0.0)])])
//!     .events(vec![PointEvent::at(1, 3, 500.0, 10.0), PointEvent::at(2, 4, 500.0, 90.0)])
//!     .build()?;
//!
//! let summary = store.road_summary()?;
//! assert_eq!(summary[0].event_count, 1);
//!
//! let hits = store.query_window(&QueryShape::rect(0.0, 0.0, 1000.0, 100.0)?)?;
//! assert_eq!(hits, vec![1, 2]);
//! # Ok::<(), roadrisk::RoadRiskError>(())
//! ```

pub mod builder;
pub mod compute;
pub mod config;
pub mod db;
pub mod error;
pub mod storage;

pub use builder::StoreBuilder;
pub use config::Config;
pub use db::{EventFilter, Store, StoreStats};
pub use error::{Result, RoadRiskError};

#[cfg(feature = "sync")]
pub use db::SyncStore;

pub use geo::{LineString, Point, Polygon, Rect};

pub use compute::{
    KMeans, QaReport, QueryShape, assign_nearest, assign_nearest_indexed, cluster_hotspots,
    cluster_hotspots_seeded, qaqc, rank_by_risk, summarize,
};
pub use compute::spatial::{SpatialIndex, SpatialIndexStats};

pub use roadrisk_types::analysis::{Assignment, Cluster, FeatureSummary};
pub use roadrisk_types::bbox::BoundingBox2D;
pub use roadrisk_types::event::PointEvent;
pub use roadrisk_types::feature::LineFeature;
pub use roadrisk_types::window::{DailyCount, SeveritySummary, TimeSeries};

pub use storage::{JsonFileSource, MemorySource, RecordSource};

pub mod prelude {
    //! Convenient re-exports for common usage.
    pub use crate::{
        Assignment, BoundingBox2D, Cluster, Config, EventFilter, FeatureSummary, LineFeature,
        PointEvent, QueryShape, RecordSource, Result, RoadRiskError, Store, StoreBuilder,
    };

    #[cfg(feature = "sync")]
    pub use crate::SyncStore;

    pub use geo::{LineString, Point, Polygon, Rect};
}

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
