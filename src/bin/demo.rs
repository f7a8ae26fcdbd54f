//! Seeds a throwaway store with a week of walking-speed samples, runs the
//! three-timeline coordinator, and prints the resulting snapshot as JSON.
//!
//! Usage: `paceline-demo [db-path]` (defaults to a file in the system temp
//! directory). Set RUST_LOG=info to watch the query lifecycle.

use anyhow::Result;
use chrono::{Duration, Utc};
use tokio::sync::mpsc;

use paceline::{
    formatted_value, MetricKind, QuantitySample, SampleStore, TimelineCoordinator,
};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let db_path = std::env::args()
        .nth(1)
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("paceline-demo.sqlite3"));

    let store = SampleStore::open(db_path)?;

    // A week of twice-daily walks at slightly varying speeds.
    let now = Utc::now();
    for day in 0..7 {
        for (hour, speed) in [(8, 1.25), (18, 1.4)] {
            let at = now - Duration::days(day) - Duration::hours(24 - hour);
            let sample = QuantitySample::new(MetricKind::WalkingSpeed, at, speed + day as f64 * 0.01);
            store.save_sample(&sample).await?;
        }
    }

    let coordinator = TimelineCoordinator::new(store.clone());
    let (updates_tx, mut updates_rx) = mpsc::unbounded_channel();
    coordinator
        .start(
            MetricKind::WalkingSpeed,
            Box::new(move || {
                let _ = updates_tx.send(());
            }),
        )
        .await?;

    // Wait for all three timelines to deliver their initial lists.
    for _ in 0..3 {
        let _ = updates_rx.recv().await;
    }

    let snapshot = coordinator.snapshot();
    for section in 0..coordinator.section_count() {
        let title = coordinator.section_title(section).unwrap_or("?");
        println!("{title}:");
        for bucket in &snapshot.slots[section] {
            println!(
                "  {}  {}",
                bucket.bucket_start.format("%Y-%m-%d"),
                formatted_value(bucket.value, MetricKind::WalkingSpeed)
            );
        }
    }

    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    coordinator.stop().await;
    Ok(())
}
