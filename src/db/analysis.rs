//! Assignment, road summaries and hotspots over the whole cached record set.

use super::Store;
use crate::compute::aggregate::{rank_by_risk, summarize};
use crate::compute::assignment::assign_nearest_indexed;
use crate::compute::cluster::KMeans;
use crate::error::Result;
use rand::SeedableRng;
use rand::rngs::StdRng;
use roadrisk_types::analysis::{Assignment, Cluster, FeatureSummary};
use roadrisk_types::event::PointEvent;

impl Store {
    /// Assign every stored event to its nearest feature within the configured
    /// search radius. Rows follow ascending event id.
    pub fn assign_nearest(&self) -> Result<Vec<Assignment>> {
        self.assign_nearest_within(self.config.search_radius)
    }

    /// [`Store::assign_nearest`] with an explicit radius.
    pub fn assign_nearest_within(&self, radius: f64) -> Result<Vec<Assignment>> {
        let events: Vec<PointEvent> = self.events.values().cloned().collect();
        assign_nearest_indexed(&events, &self.features, &self.feature_index, radius)
    }

    /// One summary per stored feature, in feature order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use roadrisk::Store;
    /// use roadrisk::config::Config;
    /// use roadrisk_types::event::PointEvent;
    /// use roadrisk_types::feature::LineFeature;
    /// use geo::line_string;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let store = Store::from_records(
    ///     Config::default(),
    ///     vec![PointEvent::at(1, 3, 500.0, 10.0), PointEvent::at(2, 4, 500.0, 90.0)],
    ///     vec![LineFeature::new(1, "arterial", line_string![(x: 0.0, y: 0.0), (x: 1000.0, y: 0.0)])],
    /// )?;
    ///
    /// let summary = store.road_summary()?;
    /// assert_eq!(summary[0].event_count, 1);
    /// assert!((summary[0].risk_score - 2.2).abs() < 1e-9);
    /// # Ok(())
    /// # }
    /// ```
    pub fn road_summary(&self) -> Result<Vec<FeatureSummary>> {
        let assignments = self.assign_nearest()?;
        Ok(summarize(&self.features, &assignments))
    }

    /// [`Store::road_summary`] ordered by descending risk score.
    pub fn riskiest_roads(&self, limit: usize) -> Result<Vec<FeatureSummary>> {
        let mut ranked = rank_by_risk(self.road_summary()?);
        ranked.truncate(limit);
        Ok(ranked)
    }

    /// Hotspots over every stored event using the configured cluster count,
    /// round count and seed.
    pub fn all_hotspots(&self) -> Result<Vec<Cluster>> {
        let events: Vec<PointEvent> = self.events.values().cloned().collect();
        let mut rng = StdRng::seed_from_u64(self.config.cluster_seed);
        KMeans::new(self.config.cluster_count)
            .with_iterations(self.config.cluster_iterations)
            .run(&events, &mut rng)
    }
}
