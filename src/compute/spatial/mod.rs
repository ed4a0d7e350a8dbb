//! Spatial indexing.

pub mod rtree;
pub use rtree::{IndexEntry, SpatialIndex, SpatialIndexStats};
