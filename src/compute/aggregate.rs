//! Per-feature aggregation of assignments into risk summaries.

use roadrisk_types::analysis::{Assignment, FeatureSummary};
use roadrisk_types::feature::LineFeature;
use rustc_hash::FxHashMap;

/// Summarize assignments per feature.
///
/// Left join: the output has one row per feature, in feature order, whether
/// or not any event was assigned to it. Unassigned rows and rows naming an
/// unknown feature are ignored. Densities are per kilometre of feature length
/// and collapse to zero for zero-length features.
///
/// # Examples
///
/// ```
/// use roadrisk::compute::aggregate::summarize;
/// use roadrisk_types::analysis::Assignment;
/// use roadrisk_types::feature::LineFeature;
/// use geo::line_string;
///
/// let roads = vec![
///     LineFeature::new(1, "arterial", line_string![(x: 0.0, y: 0.0), (x: 1000.0, y: 0.0)]),
///     LineFeature::new(2, "collector", line_string![(x: 0.0, y: 0.0), (x: 0.0, y: 500.0)]),
/// ];
/// let rows = vec![Assignment::assigned(1, 3, 1, 10.0), Assignment::unassigned(2, 4)];
///
/// let summary = summarize(&roads, &rows);
/// assert_eq!(summary.len(), 2);
/// assert_eq!(summary[0].event_count, 1);
/// assert_eq!(summary[1].event_count, 0);
/// ```
pub fn summarize(features: &[LineFeature], assignments: &[Assignment]) -> Vec<FeatureSummary> {
    let mut totals: FxHashMap<u64, (u64, u64)> = FxHashMap::default();
    for row in assignments {
        if let Some(feature_id) = row.feature_id {
            let entry = totals.entry(feature_id).or_insert((0, 0));
            entry.0 += 1;
            entry.1 += u64::from(row.severity);
        }
    }

    features
        .iter()
        .map(|feature| {
            let (event_count, severity_sum) = totals.get(&feature.id()).copied().unwrap_or((0, 0));
            FeatureSummary::from_totals(
                feature.id(),
                feature.class(),
                feature.length_m(),
                event_count,
                severity_sum,
            )
        })
        .collect()
}

/// Summaries sorted by descending risk score; equal scores keep feature order.
pub fn rank_by_risk(mut summaries: Vec<FeatureSummary>) -> Vec<FeatureSummary> {
    summaries.sort_by(|a, b| b.risk_score.total_cmp(&a.risk_score));
    summaries
}
