//! Windowed analytic queries over the cached record set.
//!
//! Every query runs in two phases: the shape's bounding box selects candidates
//! from the index, then each candidate's stored geometry is tested against the
//! exact shape. Shapes are validated before the index is touched.

use super::Store;
use crate::compute::cluster::KMeans;
use crate::compute::validation::validate_window_days;
use crate::compute::window::QueryShape;
use crate::error::{Result, RoadRiskError};
use chrono::{NaiveDate, Utc};
use geo::Point;
use rand::SeedableRng;
use rand::rngs::StdRng;
use roadrisk_types::analysis::Cluster;
use roadrisk_types::event::{MAX_HOUR, PointEvent};
use roadrisk_types::window::{SeveritySummary, TimeSeries};
use serde::{Deserialize, Serialize};

/// Optional narrowing applied after the exact spatial test.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFilter {
    /// Keep only events in this hour of day
    pub hour: Option<u8>,
    /// Keep at most this many events, lowest ids first
    pub limit: Option<usize>,
}

impl EventFilter {
    pub fn hour(hour: u8) -> Self {
        Self {
            hour: Some(hour),
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn validate(&self) -> Result<()> {
        match self.hour {
            Some(hour) if hour > MAX_HOUR => Err(RoadRiskError::InvalidInput(format!(
                "Hour filter must be in 0..={}, got: {}",
                MAX_HOUR, hour
            ))),
            _ => Ok(()),
        }
    }
}

impl Store {
    /// Raw index candidates for `shape`: a superset of [`Store::query_window`].
    pub fn query_window_candidates(&self, shape: &QueryShape) -> Result<Vec<u64>> {
        shape.validate()?;
        Ok(self.event_index.query(&shape.bbox()))
    }

    /// Ids of events whose location intersects `shape`, ascending.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use roadrisk::{QueryShape, Store};
    /// use roadrisk_types::event::PointEvent;
    /// use geo::Point;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut store = Store::new();
    /// store.insert_event(PointEvent::at(1, 2, 0.0, 0.0))?;
    /// store.insert_event(PointEvent::at(2, 2, 90.0, 90.0))?;
    ///
    /// // (90, 90) is inside the circle's bounding box but not the circle
    /// let shape = QueryShape::circle(Point::new(0.0, 0.0), 100.0)?;
    /// assert_eq!(store.query_window(&shape)?, vec![1]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn query_window(&self, shape: &QueryShape) -> Result<Vec<u64>> {
        let candidates = self.query_window_candidates(shape)?;
        let matcher = shape.matcher(self.config.circle_segments);

        let hits: Vec<u64> = candidates
            .iter()
            .copied()
            .filter(|id| {
                self.events
                    .get(id)
                    .is_some_and(|event| matcher.matches_point(&event.geometry))
            })
            .collect();

        log::debug!(
            "Event window query: {} candidates, {} exact matches",
            candidates.len(),
            hits.len()
        );
        Ok(hits)
    }

    /// Ids of events within the configured default radius of `center`, ascending.
    pub fn query_point(&self, center: Point) -> Result<Vec<u64>> {
        self.query_window(&QueryShape::point(center, &self.config)?)
    }

    /// Ids of features whose polyline intersects `shape`, in feature order.
    pub fn query_feature_window(&self, shape: &QueryShape) -> Result<Vec<u64>> {
        shape.validate()?;
        let candidates = self.feature_index.query(&shape.bbox());
        let matcher = shape.matcher(self.config.circle_segments);

        let mut hits: Vec<(usize, u64)> = candidates
            .iter()
            .filter_map(|id| {
                let pos = *self.feature_positions.get(id)?;
                matcher
                    .matches_line(self.features[pos].geometry())
                    .then_some((pos, *id))
            })
            .collect();
        hits.sort_unstable();

        log::debug!(
            "Feature window query: {} candidates, {} exact matches",
            candidates.len(),
            hits.len()
        );
        Ok(hits.into_iter().map(|(_, id)| id).collect())
    }

    /// Events inside `shape` passing `filter`, ascending by id.
    pub fn events_in(&self, shape: &QueryShape, filter: &EventFilter) -> Result<Vec<PointEvent>> {
        filter.validate()?;
        let ids = self.query_window(shape)?;

        let events = ids
            .iter()
            .filter_map(|id| self.events.get(id))
            .filter(|event| filter.hour.is_none_or(|hour| event.hour == hour))
            .take(filter.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect();
        Ok(events)
    }

    /// Daily event counts inside `shape` for the `window_days` days ending at `today`.
    ///
    /// Events without a date or dated outside the window are left out.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for an invalid shape, for `window_days` outside
    /// `1..=MAX_WINDOW_DAYS`, or when the window would start before the
    /// earliest representable date.
    pub fn time_series(
        &self,
        shape: &QueryShape,
        today: NaiveDate,
        window_days: u32,
    ) -> Result<TimeSeries> {
        validate_window_days(window_days)?;
        let ids = self.query_window(shape)?;

        let mut series = TimeSeries::empty_window(today, window_days).ok_or_else(|| {
            RoadRiskError::InvalidInput(format!(
                "Time window of {} days ending {} starts before the earliest supported date",
                window_days, today
            ))
        })?;
        let mut outside = 0usize;
        for event in ids.iter().filter_map(|id| self.events.get(id)) {
            match event.date {
                Some(date) if series.record(date) => {}
                _ => outside += 1,
            }
        }

        log::debug!(
            "Time series over {} days: {} events bucketed, {} undated or outside",
            window_days,
            series.total,
            outside
        );
        Ok(series)
    }

    /// [`Store::time_series`] ending today (UTC) over the configured window.
    pub fn time_series_default(&self, shape: &QueryShape) -> Result<TimeSeries> {
        self.time_series(shape, Utc::now().date_naive(), self.config.window_days)
    }

    /// Severity histogram and summary statistics of events inside `shape`.
    ///
    /// Every event inside the shape counts regardless of its date.
    pub fn severity_histogram(&self, shape: &QueryShape) -> Result<SeveritySummary> {
        let ids = self.query_window(shape)?;

        let mut summary = SeveritySummary::default();
        let mut severity_sum = 0u64;
        for event in ids.iter().filter_map(|id| self.events.get(id)) {
            *summary.histogram.entry(event.severity).or_insert(0) += 1;
            severity_sum += u64::from(event.severity);
            summary.total += 1;
            if let Some(date) = event.date {
                summary.min_date = Some(summary.min_date.map_or(date, |d| d.min(date)));
                summary.max_date = Some(summary.max_date.map_or(date, |d| d.max(date)));
            }
        }
        if summary.total > 0 {
            summary.avg_severity = severity_sum as f64 / summary.total as f64;
        }

        Ok(summary)
    }

    /// K-means hotspots over the events inside `shape` passing `filter`.
    ///
    /// Uses the configured round count and seed.
    pub fn hotspots(&self, shape: &QueryShape, filter: &EventFilter, k: usize) -> Result<Vec<Cluster>> {
        let events = self.events_in(shape, filter)?;
        let mut rng = StdRng::seed_from_u64(self.config.cluster_seed);
        KMeans::new(k)
            .with_iterations(self.config.cluster_iterations)
            .run(&events, &mut rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::validation::MAX_WINDOW_DAYS;
    use crate::config::Config;
    use geo::line_string;
    use roadrisk_types::feature::LineFeature;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn sample_store() -> Store {
        let events = vec![
            PointEvent::new(1, 3, 8, Some(day(1)), Point::new(0.0, 0.0)),
            PointEvent::new(2, 5, 17, Some(day(30)), Point::new(10.0, 10.0)),
            PointEvent::new(3, 1, 8, None, Point::new(5.0, 5.0)),
            PointEvent::new(4, 2, 8, Some(day(15)), Point::new(500.0, 500.0)),
        ];
        let features = vec![
            LineFeature::new(20, "arterial", line_string![(x: -50.0, y: 5.0), (x: 50.0, y: 5.0)]),
            LineFeature::new(10, "collector", line_string![(x: 400.0, y: 400.0), (x: 600.0, y: 600.0)]),
        ];
        Store::from_records(Config::default(), events, features).unwrap()
    }

    #[test]
    fn test_rect_window_inclusive() {
        let store = sample_store();
        let shape = QueryShape::rect(0.0, 0.0, 10.0, 10.0).unwrap();
        assert_eq!(store.query_window(&shape).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_candidates_are_superset() {
        let store = sample_store();
        for shape in [
            QueryShape::rect(-1.0, -1.0, 6.0, 6.0).unwrap(),
            QueryShape::circle(Point::new(0.0, 0.0), 12.0).unwrap(),
            QueryShape::circle(Point::new(480.0, 480.0), 50.0).unwrap(),
        ] {
            let candidates = store.query_window_candidates(&shape).unwrap();
            let exact = store.query_window(&shape).unwrap();
            assert!(exact.iter().all(|id| candidates.contains(id)));
        }
        // (10, 10) is a box candidate but lies outside the circle of radius 12
        let shape = QueryShape::circle(Point::new(0.0, 0.0), 12.0).unwrap();
        assert!(store.query_window_candidates(&shape).unwrap().contains(&2));
        assert_eq!(store.query_window(&shape).unwrap(), vec![1, 3]);
    }

    #[test]
    fn test_invalid_shape_rejected() {
        let store = sample_store();
        let bad = QueryShape::Circle {
            center: Point::new(0.0, 0.0),
            radius: -3.0,
        };
        assert!(store.query_window(&bad).is_err());
        assert!(store.query_window_candidates(&bad).is_err());
        assert!(store.severity_histogram(&bad).is_err());
    }

    #[test]
    fn test_query_point_uses_configured_radius() {
        let store = sample_store();
        // default 250 m reaches (10, 10) and (5, 5) but not (500, 500)
        assert_eq!(store.query_point(Point::new(0.0, 0.0)).unwrap(), vec![1, 2, 3]);

        let config = Config::default().with_default_point_radius(8.0);
        let narrow = Store::from_records(config, store.events().cloned().collect(), vec![]).unwrap();
        assert_eq!(narrow.query_point(Point::new(0.0, 0.0)).unwrap(), vec![1, 3]);

        assert!(store.query_point(Point::new(f64::NAN, 0.0)).is_err());
    }

    #[test]
    fn test_feature_window_in_feature_order() {
        let store = sample_store();
        let everything = QueryShape::rect(-100.0, -100.0, 1000.0, 1000.0).unwrap();
        assert_eq!(store.query_feature_window(&everything).unwrap(), vec![20, 10]);

        // bbox of feature 10 overlaps but the diagonal misses this corner
        let corner = QueryShape::rect(550.0, 400.0, 600.0, 450.0).unwrap();
        assert!(store.query_feature_window(&corner).unwrap().is_empty());
    }

    #[test]
    fn test_events_in_with_filter() {
        let store = sample_store();
        let shape = QueryShape::rect(-1000.0, -1000.0, 1000.0, 1000.0).unwrap();

        let all = store.events_in(&shape, &EventFilter::default()).unwrap();
        assert_eq!(all.len(), 4);

        let morning = store.events_in(&shape, &EventFilter::hour(8)).unwrap();
        assert_eq!(morning.iter().map(|e| e.id).collect::<Vec<_>>(), vec![1, 3, 4]);

        let limited = store.events_in(&shape, &EventFilter::hour(8).with_limit(2)).unwrap();
        assert_eq!(limited.iter().map(|e| e.id).collect::<Vec<_>>(), vec![1, 3]);

        assert!(store.events_in(&shape, &EventFilter::hour(24)).is_err());
    }

    #[test]
    fn test_time_series_window() {
        let store = sample_store();
        let shape = QueryShape::rect(-1000.0, -1000.0, 1000.0, 1000.0).unwrap();

        let series = store.time_series(&shape, day(30), 30).unwrap();
        assert_eq!(series.series.len(), 30);
        assert_eq!(series.start(), Some(day(1)));
        assert_eq!(series.total, 3);
        assert_eq!(series.series[0].count, 1);
        assert_eq!(series.series[14].count, 1);
        assert_eq!(series.series[29].count, 1);

        // day 1 falls out of a 29-day window
        assert_eq!(store.time_series(&shape, day(30), 29).unwrap().total, 2);
        assert!(store.time_series(&shape, day(30), 0).is_err());
    }

    #[test]
    fn test_time_series_rejects_oversized_window() {
        let store = sample_store();
        let shape = QueryShape::rect(-1000.0, -1000.0, 1000.0, 1000.0).unwrap();

        assert!(matches!(
            store.time_series(&shape, day(30), u32::MAX),
            Err(RoadRiskError::InvalidInput(_))
        ));
        assert!(matches!(
            store.time_series(&shape, day(30), MAX_WINDOW_DAYS + 1),
            Err(RoadRiskError::InvalidInput(_))
        ));
        assert_eq!(
            store.time_series(&shape, day(30), MAX_WINDOW_DAYS).unwrap().series.len(),
            MAX_WINDOW_DAYS as usize
        );
    }

    #[test]
    fn test_time_series_before_earliest_date() {
        let store = sample_store();
        let shape = QueryShape::rect(-1000.0, -1000.0, 1000.0, 1000.0).unwrap();
        let earliest = NaiveDate::MIN;

        assert!(matches!(
            store.time_series(&shape, earliest, 7),
            Err(RoadRiskError::InvalidInput(_))
        ));
        let series = store.time_series(&shape, earliest, 1).unwrap();
        assert_eq!(series.total, 0);
        assert_eq!(series.start(), Some(earliest));
    }

    #[test]
    fn test_severity_histogram() {
        let store = sample_store();
        let shape = QueryShape::rect(0.0, 0.0, 10.0, 10.0).unwrap();
        let summary = store.severity_histogram(&shape).unwrap();

        assert_eq!(summary.total, 3);
        assert_eq!(summary.count(1), 1);
        assert_eq!(summary.count(3), 1);
        assert_eq!(summary.count(5), 1);
        assert_eq!(summary.count(2), 0);
        assert_eq!(summary.histogram.len(), 5);
        assert_eq!(summary.avg_severity, 3.0);
        assert_eq!(summary.min_date, Some(day(1)));
        assert_eq!(summary.max_date, Some(day(30)));
    }

    #[test]
    fn test_empty_window_histogram() {
        let store = sample_store();
        let shape = QueryShape::rect(2000.0, 2000.0, 3000.0, 3000.0).unwrap();
        let summary = store.severity_histogram(&shape).unwrap();
        assert_eq!(summary, SeveritySummary::default());
    }

    #[test]
    fn test_hotspots_in_window() {
        let store = sample_store();
        let shape = QueryShape::rect(-1000.0, -1000.0, 1000.0, 1000.0).unwrap();
        let clusters = store.hotspots(&shape, &EventFilter::default(), 20).unwrap();
        assert_eq!(clusters.len(), 4);
        assert!(store.hotspots(&shape, &EventFilter::default(), 0).is_err());

        let none = QueryShape::rect(2000.0, 2000.0, 3000.0, 3000.0).unwrap();
        assert!(store.hotspots(&none, &EventFilter::default(), 5).unwrap().is_empty());
    }
}
