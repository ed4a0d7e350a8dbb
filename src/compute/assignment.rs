//! Nearest-feature assignment of point events to line features.
//!
//! Every event yields exactly one [`Assignment`], in input order. The nearest
//! feature is the one with minimum point-to-polyline distance; on equal
//! distances the feature that comes first in the feature slice wins. An event
//! whose nearest feature lies farther than the search radius is unassigned.

use crate::compute::geometry::point_line_distance;
use crate::compute::spatial::SpatialIndex;
use crate::compute::validation::validate_search_radius;
use crate::error::Result;
use geo::Point;
use roadrisk_types::analysis::Assignment;
use roadrisk_types::bbox::BoundingBox2D;
use roadrisk_types::event::PointEvent;
use roadrisk_types::feature::LineFeature;
use rustc_hash::FxHashMap;

/// Nearest feature to `point` among `candidates`, scanned in order.
///
/// Returns the candidate's position in the iteration and its distance.
/// Non-finite distances are skipped.
pub fn nearest_feature<'a, I>(point: &Point, candidates: I) -> Option<(usize, f64)>
where
    I: IntoIterator<Item = &'a LineFeature>,
{
    let mut best: Option<(usize, f64)> = None;

    for (pos, feature) in candidates.into_iter().enumerate() {
        let distance = point_line_distance(point, feature.geometry());
        if !distance.is_finite() {
            continue;
        }
        match best {
            // strict: the earlier feature keeps ties
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((pos, distance)),
        }
    }

    best
}

/// Assign each event to its nearest feature within `radius`.
///
/// Compares every event against every feature. Suitable when the feature set
/// is small relative to the event set; see [`assign_nearest_indexed`] for the
/// pre-filtered variant.
///
/// # Errors
///
/// Returns `InvalidInput` if `radius` is negative or non-finite.
///
/// # Examples
///
/// ```
/// use roadrisk::compute::assignment::assign_nearest;
/// use roadrisk_types::event::PointEvent;
/// use roadrisk_types::feature::LineFeature;
/// use geo::line_string;
///
/// let roads = vec![LineFeature::new(1, "arterial", line_string![(x: 0.0, y: 0.0), (x: 1000.0, y: 0.0)])];
/// let crashes = vec![PointEvent::at(1, 3, 500.0, 10.0), PointEvent::at(2, 4, 500.0, 90.0)];
///
/// let rows = assign_nearest(&crashes, &roads, 80.0)?;
/// assert_eq!(rows[0].feature_id, Some(1));
/// assert_eq!(rows[1].feature_id, None);
/// # Ok::<(), roadrisk::RoadRiskError>(())
/// ```
pub fn assign_nearest(
    events: &[PointEvent],
    features: &[LineFeature],
    radius: f64,
) -> Result<Vec<Assignment>> {
    validate_search_radius(radius)?;

    let assignments: Vec<Assignment> = events
        .iter()
        .map(|event| {
            let nearest = nearest_feature(&event.geometry, features)
                .map(|(pos, distance)| (features[pos].id(), distance));
            to_assignment(event, nearest, radius)
        })
        .collect();

    log_outcome(&assignments, features.len(), radius);
    Ok(assignments)
}

/// Same result as [`assign_nearest`], using `feature_index` as a pre-filter.
///
/// `feature_index` must hold one box per feature keyed by feature id. For each
/// event only features whose box overlaps the event point expanded by `radius`
/// are measured; candidates are scanned in feature-slice order so ties resolve
/// exactly as in the exhaustive scan.
///
/// # Errors
///
/// Returns `InvalidInput` if `radius` is negative or non-finite.
pub fn assign_nearest_indexed(
    events: &[PointEvent],
    features: &[LineFeature],
    feature_index: &SpatialIndex,
    radius: f64,
) -> Result<Vec<Assignment>> {
    validate_search_radius(radius)?;

    let positions: FxHashMap<u64, usize> = features
        .iter()
        .enumerate()
        .map(|(pos, feature)| (feature.id(), pos))
        .collect();

    let mut measured = 0usize;
    let assignments: Vec<Assignment> = events
        .iter()
        .map(|event| {
            let window = BoundingBox2D::around(&event.geometry, radius);
            let mut candidates: Vec<usize> = feature_index
                .query(&window)
                .into_iter()
                .filter_map(|id| positions.get(&id).copied())
                .collect();
            candidates.sort_unstable();
            measured += candidates.len();

            let nearest = nearest_feature(
                &event.geometry,
                candidates.iter().map(|&pos| &features[pos]),
            )
            .map(|(i, distance)| (features[candidates[i]].id(), distance));
            to_assignment(event, nearest, radius)
        })
        .collect();

    log::debug!(
        "Index pre-filter measured {} event/feature pairs out of {}",
        measured,
        events.len() * features.len()
    );
    log_outcome(&assignments, features.len(), radius);
    Ok(assignments)
}

fn to_assignment(event: &PointEvent, nearest: Option<(u64, f64)>, radius: f64) -> Assignment {
    match nearest {
        Some((feature_id, distance)) if distance <= radius => {
            Assignment::assigned(event.id, event.severity, feature_id, distance)
        }
        _ => Assignment::unassigned(event.id, event.severity),
    }
}

fn log_outcome(assignments: &[Assignment], feature_count: usize, radius: f64) {
    let assigned = assignments.iter().filter(|a| a.is_assigned()).count();
    log::debug!(
        "Assigned {} of {} events to {} features within {} m",
        assigned,
        assignments.len(),
        feature_count,
        radius
    );
}
