//! Derived rows produced by assignment, aggregation and clustering.

use geo::Point;
use serde::{Deserialize, Serialize};

/// Weight of severity density in the risk score.
pub const SEVERITY_WEIGHT: f64 = 0.6;
/// Weight of event density in the risk score.
pub const EVENT_WEIGHT: f64 = 0.4;

/// Nearest-feature outcome for a single event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub event_id: u64,
    /// Severity of the event, carried for aggregation
    pub severity: u8,
    /// Nearest feature within the search radius, `None` when unassigned
    pub feature_id: Option<u64>,
    /// Distance to `feature_id`, `None` when unassigned
    pub distance: Option<f64>,
}

impl Assignment {
    pub fn assigned(event_id: u64, severity: u8, feature_id: u64, distance: f64) -> Self {
        Self {
            event_id,
            severity,
            feature_id: Some(feature_id),
            distance: Some(distance),
        }
    }

    pub fn unassigned(event_id: u64, severity: u8) -> Self {
        Self {
            event_id,
            severity,
            feature_id: None,
            distance: None,
        }
    }

    pub fn is_assigned(&self) -> bool {
        self.feature_id.is_some()
    }
}

/// Per-feature event totals and risk metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSummary {
    pub feature_id: u64,
    pub class: String,
    pub length_m: f64,
    pub event_count: u64,
    pub severity_sum: u64,
    pub events_per_km: f64,
    pub severity_per_km: f64,
    pub risk_score: f64,
}

impl FeatureSummary {
    /// Build a summary from raw totals.
    ///
    /// A zero (or non-positive) length yields zero densities and a zero score.
    pub fn from_totals(
        feature_id: u64,
        class: impl Into<String>,
        length_m: f64,
        event_count: u64,
        severity_sum: u64,
    ) -> Self {
        let (events_per_km, severity_per_km) = if length_m > 0.0 {
            let km = length_m / 1000.0;
            (event_count as f64 / km, severity_sum as f64 / km)
        } else {
            (0.0, 0.0)
        };

        Self {
            feature_id,
            class: class.into(),
            length_m,
            event_count,
            severity_sum,
            events_per_km,
            severity_per_km,
            risk_score: SEVERITY_WEIGHT * severity_per_km + EVENT_WEIGHT * events_per_km,
        }
    }
}

/// A k-means hotspot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    /// Index of the centroid this cluster grew from
    pub cluster_id: usize,
    pub member_count: usize,
    pub mean_severity: f64,
    pub centroid: Point,
}
