//! K-means hotspot clustering over event locations.
//!
//! Runs a fixed number of Lloyd rounds with no convergence check. Initial
//! centroids are distinct events drawn without replacement from the supplied
//! random source, so results are reproducible for a given seed.

use crate::compute::validation::{validate_cluster_count, validate_point};
use crate::error::Result;
use geo::Point;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index::sample;
use roadrisk_types::analysis::Cluster;
use roadrisk_types::event::PointEvent;

/// Default number of assignment/update rounds.
pub const DEFAULT_ITERATIONS: usize = 10;

/// Fixed-round k-means parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KMeans {
    pub k: usize,
    pub iterations: usize,
}

impl KMeans {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            iterations: DEFAULT_ITERATIONS,
        }
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Cluster `events`, drawing initial centroids from `rng`.
    ///
    /// Returns one [`Cluster`] per centroid that owns at least one event in
    /// the final round, ordered by member count (largest first, equal counts
    /// keep centroid order). An empty input gives an empty result.
    ///
    /// # Errors
    ///
    /// `InvalidInput` when `k == 0` or an event has non-finite coordinates.
    pub fn run<R: Rng + ?Sized>(&self, events: &[PointEvent], rng: &mut R) -> Result<Vec<Cluster>> {
        validate_cluster_count(self.k)?;
        for event in events {
            validate_point(&event.geometry)?;
        }
        if events.is_empty() {
            return Ok(Vec::new());
        }

        let points: Vec<[f64; 2]> = events.iter().map(|e| [e.x(), e.y()]).collect();
        let k = self.k.min(points.len());
        let mut centroids: Vec<[f64; 2]> = sample(rng, points.len(), k)
            .into_iter()
            .map(|i| points[i])
            .collect();

        // at least one round so every event carries a label
        let rounds = self.iterations.max(1);
        let mut labels = vec![0usize; points.len()];
        for _ in 0..rounds {
            for (label, p) in labels.iter_mut().zip(&points) {
                *label = nearest_centroid(p, &centroids);
            }
            update_centroids(&mut centroids, &points, &labels);
        }

        let mut counts = vec![0usize; k];
        let mut severity_sums = vec![0u64; k];
        for (event, &label) in events.iter().zip(&labels) {
            counts[label] += 1;
            severity_sums[label] += u64::from(event.severity);
        }

        let mut clusters: Vec<Cluster> = centroids
            .iter()
            .enumerate()
            .filter(|(i, _)| counts[*i] > 0)
            .map(|(i, c)| Cluster {
                cluster_id: i,
                member_count: counts[i],
                mean_severity: severity_sums[i] as f64 / counts[i] as f64,
                centroid: Point::new(c[0], c[1]),
            })
            .collect();
        // stable: equal counts stay in centroid order
        clusters.sort_by(|a, b| b.member_count.cmp(&a.member_count));

        log::debug!(
            "K-means over {} events: {} of {} centroids populated after {} rounds",
            events.len(),
            clusters.len(),
            k,
            rounds
        );
        Ok(clusters)
    }
}

fn squared_distance(a: &[f64; 2], b: &[f64; 2]) -> f64 {
    let (dx, dy) = (a[0] - b[0], a[1] - b[1]);
    dx * dx + dy * dy
}

/// Index of the closest centroid; the lowest index wins ties.
fn nearest_centroid(p: &[f64; 2], centroids: &[[f64; 2]]) -> usize {
    let mut best = 0;
    let mut best_d2 = f64::INFINITY;
    for (i, c) in centroids.iter().enumerate() {
        let d2 = squared_distance(p, c);
        if d2 < best_d2 {
            best = i;
            best_d2 = d2;
        }
    }
    best
}

/// Move every populated centroid to the mean of its members. Empty ones stay put.
fn update_centroids(centroids: &mut [[f64; 2]], points: &[[f64; 2]], labels: &[usize]) {
    let mut sums = vec![[0.0f64; 2]; centroids.len()];
    let mut counts = vec![0usize; centroids.len()];
    for (p, &label) in points.iter().zip(labels) {
        sums[label][0] += p[0];
        sums[label][1] += p[1];
        counts[label] += 1;
    }
    for ((centroid, sum), &count) in centroids.iter_mut().zip(&sums).zip(&counts) {
        if count > 0 {
            *centroid = [sum[0] / count as f64, sum[1] / count as f64];
        }
    }
}

/// Cluster events into at most `k` hotspots with the default round count.
///
/// # Examples
///
/// ```
/// use roadrisk::compute::cluster::cluster_hotspots;
/// use roadrisk_types::event::PointEvent;
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
///
/// let crashes = vec![PointEvent::at(1, 2, 0.0, 0.0), PointEvent::at(2, 4, 1.0, 0.0)];
/// let mut rng = StdRng::seed_from_u64(42);
///
/// let clusters = cluster_hotspots(&crashes, 5, &mut rng)?;
/// let members: usize = clusters.iter().map(|c| c.member_count).sum();
/// assert_eq!(members, 2);
/// # Ok::<(), roadrisk::RoadRiskError>(())
/// ```
pub fn cluster_hotspots<R: Rng + ?Sized>(
    events: &[PointEvent],
    k: usize,
    rng: &mut R,
) -> Result<Vec<Cluster>> {
    KMeans::new(k).run(events, rng)
}

/// [`cluster_hotspots`] with a `StdRng` seeded from `seed`.
pub fn cluster_hotspots_seeded(events: &[PointEvent], k: usize, seed: u64) -> Result<Vec<Cluster>> {
    let mut rng = StdRng::seed_from_u64(seed);
    cluster_hotspots(events, k, &mut rng)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_groups() -> Vec<PointEvent> {
        vec![
            PointEvent::at(1, 1, 0.0, 0.0),
            PointEvent::at(2, 1, 0.0, 1.0),
            PointEvent::at(3, 5, 100.0, 0.0),
            PointEvent::at(4, 5, 100.0, 1.0),
        ]
    }

    #[test]
    fn test_empty_cloud() {
        assert!(cluster_hotspots_seeded(&[], 20, 42).unwrap().is_empty());
    }

    #[test]
    fn test_zero_k_rejected() {
        assert!(cluster_hotspots_seeded(&two_groups(), 0, 42).is_err());
        assert!(cluster_hotspots_seeded(&[], 0, 42).is_err());
    }

    #[test]
    fn test_four_points_two_clusters() {
        // Seeds on opposite sides split by x; seeds on one side split by y.
        let events = two_groups();

        for seed in 0..50 {
            let clusters = cluster_hotspots_seeded(&events, 2, seed).unwrap();
            assert_eq!(clusters.len(), 2);
            assert!(clusters.iter().all(|c| c.member_count == 2));

            let mut means: Vec<f64> = clusters.iter().map(|c| c.mean_severity).collect();
            means.sort_by(f64::total_cmp);
            if means == vec![1.0, 5.0] {
                for c in &clusters {
                    let expected_x = if c.mean_severity == 1.0 { 0.0 } else { 100.0 };
                    assert_eq!(c.centroid, Point::new(expected_x, 0.5));
                }
            } else {
                assert_eq!(means, vec![3.0, 3.0]);
                assert!(clusters.iter().all(|c| c.centroid.x() == 50.0));
            }
        }
    }

    #[test]
    fn test_k_larger_than_cloud() {
        let events = vec![
            PointEvent::at(1, 3, 0.0, 0.0),
            PointEvent::at(2, 3, 10.0, 0.0),
            PointEvent::at(3, 3, 20.0, 0.0),
        ];
        let clusters = cluster_hotspots_seeded(&events, 20, 42).unwrap();
        assert_eq!(clusters.len(), 3);
        assert!(clusters.iter().all(|c| c.member_count == 1));
    }

    #[test]
    fn test_single_cluster_mean() {
        let events = vec![
            PointEvent::at(1, 1, 0.0, 0.0),
            PointEvent::at(2, 2, 10.0, 0.0),
            PointEvent::at(3, 3, 20.0, 30.0),
        ];
        let clusters = cluster_hotspots_seeded(&events, 1, 7).unwrap();
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].member_count, 3);
        assert_eq!(clusters[0].mean_severity, 2.0);
        assert_eq!(clusters[0].centroid, Point::new(10.0, 10.0));
    }

    #[test]
    fn test_sorted_by_member_count() {
        let mut events = Vec::new();
        for i in 0..6 {
            events.push(PointEvent::at(i, 2, i as f64, 0.0));
        }
        for i in 6..8 {
            events.push(PointEvent::at(i, 4, 10_000.0 + i as f64, 0.0));
        }
        for seed in 0..10 {
            let clusters = cluster_hotspots_seeded(&events, 2, seed).unwrap();
            assert!(clusters.windows(2).all(|w| w[0].member_count >= w[1].member_count));
            assert_eq!(clusters.iter().map(|c| c.member_count).sum::<usize>(), 8);
        }
    }

    #[test]
    fn test_same_seed_same_result() {
        let events: Vec<PointEvent> = (0..50)
            .map(|i| PointEvent::at(i, (i % 5) as u8 + 1, (i * 37 % 101) as f64, (i * 53 % 89) as f64))
            .collect();
        let a = cluster_hotspots_seeded(&events, 4, 42).unwrap();
        let b = cluster_hotspots_seeded(&events, 4, 42).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_nearest_centroid_tie_lowest_index() {
        let centroids = [[10.0, 0.0], [-10.0, 0.0]];
        assert_eq!(nearest_centroid(&[0.0, 0.0], &centroids), 0);
    }
}
