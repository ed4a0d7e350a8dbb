//! # roadrisk-types
//!
//! Record and result types shared by the roadrisk engine and its hosts.
//!
//! - **Records**: `LineFeature` (road segments), `PointEvent` (crashes)
//! - **Boxes**: `BoundingBox2D`, the inclusive axis-aligned rectangle used by the index
//! - **Derived rows**: `Assignment`, `FeatureSummary`, `Cluster`
//! - **Window outputs**: `TimeSeries`, `SeveritySummary`
//!
//! All types are serializable with Serde and built on the `geo` crate's
//! geometric primitives. Coordinates are expected in a projected, linear-unit
//! system (meters).
//!
//! ## Examples
//!
//! ```rust
//! use roadrisk_types::feature::LineFeature;
//! use geo::line_string;
//!
//! let road = LineFeature::new(1, "arterial", line_string![(x: 0.0, y: 0.0), (x: 1000.0, y: 0.0)]);
//! assert_eq!(road.length_m(), 1000.0);
//! ```

pub mod analysis;
pub mod bbox;
pub mod event;
pub mod feature;
pub mod window;

pub use geo;
