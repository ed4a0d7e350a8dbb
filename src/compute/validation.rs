//! Validation for query parameters and ingested records.
//!
//! Everything here runs before the spatial index is touched; a failure means
//! no partial computation happened.

use crate::error::{Result, RoadRiskError};
use geo::Point;
use roadrisk_types::bbox::BoundingBox2D;
use roadrisk_types::event::PointEvent;
use roadrisk_types::feature::LineFeature;
use serde::{Deserialize, Serialize};

/// Validates a point has finite coordinates.
///
/// # Examples
///
/// ```
/// use roadrisk::compute::validation::validate_point;
/// use geo::Point;
///
/// assert!(validate_point(&Point::new(-8_230_000.0, 4_970_000.0)).is_ok());
/// assert!(validate_point(&Point::new(f64::NAN, 0.0)).is_err());
/// ```
pub fn validate_point(point: &Point) -> Result<()> {
    let (x, y) = (point.x(), point.y());

    if !x.is_finite() {
        return Err(RoadRiskError::InvalidInput(format!(
            "X coordinate must be finite, got: {}",
            x
        )));
    }

    if !y.is_finite() {
        return Err(RoadRiskError::InvalidInput(format!(
            "Y coordinate must be finite, got: {}",
            y
        )));
    }

    Ok(())
}

/// Validates a search radius: finite and non-negative.
pub fn validate_search_radius(radius: f64) -> Result<()> {
    if !radius.is_finite() || radius < 0.0 {
        return Err(RoadRiskError::InvalidInput(format!(
            "Search radius must be finite and non-negative, got: {}",
            radius
        )));
    }
    Ok(())
}

/// Validates a query radius: finite and strictly positive.
pub fn validate_query_radius(radius: f64) -> Result<()> {
    if !radius.is_finite() || radius <= 0.0 {
        return Err(RoadRiskError::InvalidInput(format!(
            "Query radius must be positive and finite, got: {}",
            radius
        )));
    }
    Ok(())
}

/// Validates a cluster count.
pub fn validate_cluster_count(k: usize) -> Result<()> {
    if k == 0 {
        return Err(RoadRiskError::InvalidInput(
            "Cluster count must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

/// Longest accepted time window, in days (about a century).
pub const MAX_WINDOW_DAYS: u32 = 36_600;

pub fn validate_window_days(days: u32) -> Result<()> {
    if days == 0 {
        return Err(RoadRiskError::InvalidInput(
            "Time window must span at least one day".to_string(),
        ));
    }
    if days > MAX_WINDOW_DAYS {
        return Err(RoadRiskError::InvalidInput(format!(
            "Time window must span at most {} days, got: {}",
            MAX_WINDOW_DAYS, days
        )));
    }
    Ok(())
}

/// Validates rectangle corners given explicitly.
///
/// Unlike [`BoundingBox2D::new`], which silently normalizes, inverted corners
/// are rejected here.
pub fn validate_rect_corners(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<()> {
    if ![min_x, min_y, max_x, max_y].iter().all(|v| v.is_finite()) {
        return Err(RoadRiskError::InvalidInput(format!(
            "Bounding box coordinates must be finite, got: ({}, {}, {}, {})",
            min_x, min_y, max_x, max_y
        )));
    }
    if min_x > max_x {
        return Err(RoadRiskError::InvalidInput(format!(
            "min_x ({}) must be <= max_x ({})",
            min_x, max_x
        )));
    }
    if min_y > max_y {
        return Err(RoadRiskError::InvalidInput(format!(
            "min_y ({}) must be <= max_y ({})",
            min_y, max_y
        )));
    }
    Ok(())
}

pub fn validate_bbox(bbox: &BoundingBox2D) -> Result<()> {
    validate_rect_corners(bbox.min_x(), bbox.min_y(), bbox.max_x(), bbox.max_y())
}

/// Validates an event before it is stored.
pub fn validate_event(event: &PointEvent) -> Result<()> {
    validate_point(&event.geometry)
        .map_err(|e| RoadRiskError::InvalidInput(format!("Event {}: {}", event.id, e)))
}

/// Validates a feature before it is stored: at least two vertices, all finite.
pub fn validate_feature(feature: &LineFeature) -> Result<()> {
    if feature.vertex_count() < 2 {
        return Err(RoadRiskError::InvalidInput(format!(
            "Feature {}: polyline needs at least 2 vertices, got {}",
            feature.id(),
            feature.vertex_count()
        )));
    }

    for (idx, coord) in feature.geometry().coords().enumerate() {
        validate_point(&Point::from(*coord)).map_err(|e| {
            RoadRiskError::InvalidInput(format!(
                "Feature {} vertex at index {}: {}",
                feature.id(),
                idx,
                e
            ))
        })?;
    }

    Ok(())
}

/// Geometry quality counts for a raw record batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaReport {
    pub features_total: usize,
    /// Features with no vertices at all
    pub features_null_geometry: usize,
    /// Features failing [`validate_feature`]
    pub features_invalid: usize,
    pub events_total: usize,
    /// Events failing [`validate_event`]
    pub events_invalid: usize,
}

impl QaReport {
    pub fn is_clean(&self) -> bool {
        self.features_invalid == 0 && self.events_invalid == 0
    }
}

/// Count null and invalid geometries in a batch before ingest.
pub fn qaqc(events: &[PointEvent], features: &[LineFeature]) -> QaReport {
    let report = QaReport {
        features_total: features.len(),
        features_null_geometry: features.iter().filter(|f| f.vertex_count() == 0).count(),
        features_invalid: features
            .iter()
            .filter(|f| validate_feature(f).is_err())
            .count(),
        events_total: events.len(),
        events_invalid: events.iter().filter(|e| validate_event(e).is_err()).count(),
    };

    if !report.is_clean() {
        log::warn!(
            "QA found {} invalid features and {} invalid events",
            report.features_invalid,
            report.events_invalid
        );
    }

    report
}
