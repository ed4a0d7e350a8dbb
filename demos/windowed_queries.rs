//! Windowed analytics against a shared store that is refreshed in the background.
//!
//! Run with: cargo run --example windowed_queries --features sync

#![cfg(feature = "sync")]

use chrono::{Duration, NaiveDate};
use geo::{Point, line_string};
use roadrisk::{EventFilter, LineFeature, MemorySource, PointEvent, QueryShape, SyncStore};
use std::thread;

fn crashes(today: NaiveDate, offset: u64, count: u64) -> Vec<PointEvent> {
    (0..count)
        .map(|i| {
            PointEvent::new(
                offset + i,
                (i % 5) as u8 + 1,
                (i % 24) as u8,
                Some(today - Duration::days((i % 45) as i64)),
                Point::new((i * 37 % 2000) as f64, (i * 91 % 2000) as f64),
            )
        })
        .collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    println!("=== Windowed queries ===\n");

    let today = NaiveDate::from_ymd_opt(2024, 9, 30).ok_or("invalid date")?;
    let roads = vec![LineFeature::new(
        1,
        "arterial",
        line_string![(x: 0.0, y: 1000.0), (x: 2000.0, y: 1000.0)],
    )];
    let mut source = MemorySource::new(crashes(today, 0, 500), roads);

    let store = SyncStore::new();
    store.refresh_from(&source)?;

    let rect = QueryShape::rect(0.0, 0.0, 1000.0, 1000.0)?;
    let center = Point::new(1000.0, 1000.0);
    let circle = QueryShape::point(center, store.snapshot().config())?;

    println!("1. Rectangle window");
    let series = store.time_series(&rect, today, 30)?;
    println!("   {} crashes over the last 30 days", series.total);
    for day in series.series.iter().rev().take(5) {
        println!("   {}  {}", day.date, day.count);
    }

    println!("2. Point + {} m radius", store.snapshot().config().default_point_radius);
    println!("   {} crashes in range", store.query_point(center)?.len());
    let summary = store.severity_histogram(&circle)?;
    println!(
        "   total {}  avg severity {:.2}  dates {:?}..{:?}",
        summary.total, summary.avg_severity, summary.min_date, summary.max_date
    );
    for (severity, count) in &summary.histogram {
        println!("   severity {}: {}", severity, count);
    }
    let rush_hour = store.events_in(&circle, &EventFilter::hour(17).with_limit(10))?;
    println!("   {} crashes at 17:00 (showing at most 10)", rush_hour.len());

    println!("3. Refresh while readers run");
    let readers: Vec<_> = (0..3)
        .map(|id| {
            let reader = store.clone();
            thread::spawn(move || {
                let mut last = 0;
                for _ in 0..50 {
                    last = reader.query_window(&rect).map(|ids| ids.len()).unwrap_or(0);
                }
                println!("   reader {} last saw {} crashes in the rectangle", id, last);
            })
        })
        .collect();

    for round in 1..=5 {
        source.set_events(crashes(today, round * 10_000, 500 + round * 100));
        store.refresh_from(&source)?;
    }
    for reader in readers {
        reader.join().map_err(|_| "reader thread panicked")?;
    }

    let stats = store.stats();
    println!("   final store: {} crashes, {} roads", stats.event_count, stats.feature_count);
    Ok(())
}
