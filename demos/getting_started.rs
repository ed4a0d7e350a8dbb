//! Getting started: load roads and crashes, assign, score and cluster.
//!
//! Run with: RUST_LOG=debug cargo run --example getting_started

use geo::line_string;
use roadrisk::{Config, PointEvent, StoreBuilder, LineFeature, rank_by_risk};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    println!("=== roadrisk getting started ===\n");

    let roads = vec![
        LineFeature::new(1, "arterial", line_string![(x: 0.0, y: 0.0), (x: 2000.0, y: 0.0)]),
        LineFeature::new(2, "collector", line_string![(x: 1000.0, y: -800.0), (x: 1000.0, y: 800.0)]),
        LineFeature::new(3, "collector", line_string![(x: 0.0, y: 600.0), (x: 800.0, y: 600.0), (x: 800.0, y: 1400.0)]),
    ];

    let mut crashes = Vec::new();
    for i in 0..40u64 {
        // bunch up near the main intersection, spread the rest along road 1
        let (x, y) = if i % 3 == 0 {
            (1000.0 + (i % 7) as f64 * 5.0, (i % 5) as f64 * 8.0)
        } else {
            (i as f64 * 50.0, 20.0 + (i % 4) as f64 * 15.0)
        };
        crashes.push(PointEvent::at(i, (i % 5) as u8 + 1, x, y));
    }

    let store = StoreBuilder::new()
        .config(Config::default().with_cluster_count(4))
        .features(roads)
        .events(crashes)
        .build()?;
    println!("1. Loaded {} crashes and {} roads", store.event_count(), store.feature_count());

    let assignments = store.assign_nearest()?;
    let assigned = assignments.iter().filter(|a| a.is_assigned()).count();
    println!(
        "2. Assigned {} of {} crashes within {} m",
        assigned,
        assignments.len(),
        store.config().search_radius
    );

    println!("3. Roads by risk:");
    for summary in rank_by_risk(store.road_summary()?) {
        println!(
            "   road {:>2} ({:<9}) {:>6.0} m  crashes {:>2}  risk {:>7.2}",
            summary.feature_id, summary.class, summary.length_m, summary.event_count, summary.risk_score
        );
    }

    println!("4. Hotspots:");
    for cluster in store.all_hotspots()? {
        println!(
            "   cluster {} at ({:.0}, {:.0}): {} crashes, mean severity {:.2}",
            cluster.cluster_id,
            cluster.centroid.x(),
            cluster.centroid.y(),
            cluster.member_count,
            cluster.mean_severity
        );
    }

    Ok(())
}
