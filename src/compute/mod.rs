//! Compute layer for assignment, aggregation, clustering and window matching.
//!
//! Everything here operates on borrowed slices and never owns records; the
//! store in [`crate::db`] feeds it. Keeping it free of storage concerns lets
//! hosts run the algorithms on their own record sets too.

pub mod aggregate;
pub mod assignment;
pub mod cluster;
pub mod geometry;
pub mod spatial;
pub mod validation;
pub mod window;

pub use aggregate::{rank_by_risk, summarize};
pub use assignment::{assign_nearest, assign_nearest_indexed};
pub use cluster::{KMeans, cluster_hotspots, cluster_hotspots_seeded};
pub use validation::{QaReport, qaqc};
pub use window::{QueryShape, ShapeMatcher};
