use chrono::NaiveDate;
use geo::{LineString, Point, line_string};
use roadrisk::{
    Config, EventFilter, LineFeature, PointEvent, QueryShape, RoadRiskError, Store, SyncStore,
    assign_nearest, assign_nearest_indexed, cluster_hotspots_seeded, summarize,
};
use roadrisk::compute::geometry::line_bbox;
use roadrisk::SpatialIndex;
use std::thread;

/// Test 1: Large dataset, index pre-filter agrees with the exhaustive scan
#[test]
fn test_large_assignment_indexed_matches_naive() {
    let mut features = Vec::new();
    for i in 0..50u64 {
        let y = i as f64 * 200.0;
        features.push(LineFeature::new(
            i,
            if i % 2 == 0 { "arterial" } else { "collector" },
            line_string![(x: 0.0, y: y), (x: 5000.0, y: y + 50.0), (x: 10_000.0, y: y)],
        ));
    }
    let events: Vec<PointEvent> = (0..5000u64)
        .map(|i| {
            let x = (i * 37 % 10_000) as f64;
            let y = (i * 53 % 10_000) as f64;
            PointEvent::at(i, (i % 5) as u8 + 1, x, y)
        })
        .collect();

    let index = SpatialIndex::bulk_load(
        features
            .iter()
            .filter_map(|f| line_bbox(f.geometry()).map(|b| (f.id(), b))),
    );

    let naive = assign_nearest(&events, &features, 80.0).unwrap();
    let indexed = assign_nearest_indexed(&events, &features, &index, 80.0).unwrap();
    assert_eq!(naive, indexed);
    assert_eq!(naive.len(), events.len());
    assert!(naive.iter().all(|a| a.distance.is_none_or(|d| d <= 80.0)));

    let summary = summarize(&features, &naive);
    assert_eq!(summary.len(), features.len());
    assert!(summary.iter().all(|s| s.risk_score >= 0.0));
}

/// Test 2: Extreme but finite projected coordinates
#[test]
fn test_extreme_coordinates() {
    let mut store = Store::new();
    let far = 2.0e7;
    store.insert_event(PointEvent::at(1, 2, far, -far)).unwrap();
    store.insert_event(PointEvent::at(2, 2, -far, far)).unwrap();

    let shape = QueryShape::rect(far - 1.0, -far - 1.0, far + 1.0, -far + 1.0).unwrap();
    assert_eq!(store.query_window(&shape).unwrap(), vec![1]);
}

/// Test 3: Non-finite inputs are rejected before any index access
#[test]
fn test_non_finite_inputs() {
    let mut store = Store::new();
    assert!(matches!(
        store.insert_event(PointEvent::at(1, 1, f64::NAN, 0.0)),
        Err(RoadRiskError::InvalidInput(_))
    ));
    assert!(QueryShape::rect(0.0, 0.0, f64::INFINITY, 1.0).is_err());
    assert!(QueryShape::circle(Point::new(0.0, f64::NAN), 10.0).is_err());
    assert!(assign_nearest(&[], &[], f64::NAN).is_err());
}

/// Test 4: Degenerate features
#[test]
fn test_zero_length_feature() {
    let features = vec![LineFeature::new(
        9,
        "arterial",
        line_string![(x: 5.0, y: 5.0), (x: 5.0, y: 5.0)],
    )];
    let events = vec![PointEvent::at(1, 4, 5.0, 6.0)];

    let rows = assign_nearest(&events, &features, 80.0).unwrap();
    assert_eq!(rows[0].feature_id, Some(9));
    assert_eq!(rows[0].distance, Some(1.0));

    let summary = summarize(&features, &rows);
    assert_eq!(summary[0].event_count, 1);
    assert_eq!(summary[0].events_per_km, 0.0);
    assert_eq!(summary[0].risk_score, 0.0);
}

#[test]
fn test_single_vertex_feature_rejected_by_store() {
    let mut store = Store::new();
    let err = store
        .insert_feature(LineFeature::new(1, "arterial", LineString::from(vec![(0.0, 0.0)])))
        .unwrap_err();
    assert!(matches!(err, RoadRiskError::InvalidInput(_)));
}

/// Test 5: Clustering edge cases
#[test]
fn test_clustering_edges() {
    assert!(cluster_hotspots_seeded(&[], 3, 42).unwrap().is_empty());

    let same_spot: Vec<PointEvent> = (0..10).map(|i| PointEvent::at(i, 3, 7.0, 7.0)).collect();
    let clusters = cluster_hotspots_seeded(&same_spot, 4, 42).unwrap();
    // coincident centroids: ties go to the first, the rest stay empty
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].member_count, 10);
    assert_eq!(clusters[0].centroid, Point::new(7.0, 7.0));

    let three: Vec<PointEvent> = (0..3).map(|i| PointEvent::at(i, 1, i as f64 * 100.0, 0.0)).collect();
    let clusters = cluster_hotspots_seeded(&three, 10, 42).unwrap();
    assert!(clusters.len() <= 3);

    assert!(matches!(
        cluster_hotspots_seeded(&three, 0, 42),
        Err(RoadRiskError::InvalidInput(_))
    ));
}

/// Test 6: Empty windows are empty results, not errors
#[test]
fn test_empty_windows() {
    let store = Store::new();
    let shape = QueryShape::rect(0.0, 0.0, 10.0, 10.0).unwrap();
    let today = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();

    assert!(store.query_window(&shape).unwrap().is_empty());
    assert!(store.events_in(&shape, &EventFilter::default()).unwrap().is_empty());
    assert!(store.hotspots(&shape, &EventFilter::default(), 3).unwrap().is_empty());

    let series = store.time_series(&shape, today, 7).unwrap();
    assert_eq!(series.series.len(), 7);
    assert_eq!(series.total, 0);

    let summary = store.severity_histogram(&shape).unwrap();
    assert_eq!(summary.total, 0);
    assert_eq!(summary.avg_severity, 0.0);
    assert_eq!(summary.histogram.len(), 5);
}

/// Test 7: Time series edges
#[test]
fn test_time_series_edges() {
    let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    let store = Store::from_records(
        Config::default(),
        vec![
            PointEvent::at(1, 2, 0.0, 0.0).with_date(today),
            PointEvent::at(2, 2, 0.0, 0.0).with_date(today + chrono::Duration::days(1)),
            PointEvent::at(3, 2, 0.0, 0.0),
            PointEvent::at(4, 2, 0.0, 0.0).with_date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()),
        ],
        vec![],
    )
    .unwrap();
    let shape = QueryShape::circle(Point::new(0.0, 0.0), 1.0).unwrap();

    // future-dated and undated events are excluded; the leap day is in range
    let series = store.time_series(&shape, today, 2).unwrap();
    assert_eq!(series.total, 2);
    assert_eq!(series.start(), NaiveDate::from_ymd_opt(2024, 2, 29));

    let single = store.time_series(&shape, today, 1).unwrap();
    assert_eq!(single.series.len(), 1);
    assert_eq!(single.total, 1);

    assert!(matches!(
        store.time_series(&shape, today, 0),
        Err(RoadRiskError::InvalidInput(_))
    ));
}

/// Test 8: Concurrent readers during refreshes
#[test]
fn test_concurrent_reads_during_refresh() {
    let store = SyncStore::new();
    let batch = |offset: u64| -> Vec<PointEvent> {
        (0..50).map(|i| PointEvent::at(offset + i, 1, i as f64, 0.0)).collect()
    };
    store.refresh(batch(0), vec![]).unwrap();

    let shape = QueryShape::rect(-1.0, -1.0, 60.0, 1.0).unwrap();
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let reader = store.clone();
            thread::spawn(move || {
                for _ in 0..100 {
                    let snapshot = reader.snapshot();
                    let ids = snapshot.query_window(&shape).unwrap();
                    assert_eq!(ids.len(), 50);
                    assert_eq!(ids[0] % 1000, 0);
                    assert_eq!(snapshot.event_count(), 50);
                }
            })
        })
        .collect();

    for round in 1..=25 {
        store.refresh(batch(round * 1000), vec![]).unwrap();
    }
    for handle in handles {
        handle.join().unwrap();
    }
}
