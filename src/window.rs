use chrono::{DateTime, Duration, Utc};

use crate::models::Timeline;

/// Clock source for window resolution. `Fixed` pins `now` so window math is
/// reproducible in tests; production code uses `System`.
#[derive(Debug, Clone, Copy)]
pub enum Clock {
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(at) => *at,
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Clock::System
    }
}

/// Concrete parameters of one statistics query: which samples to consider
/// (predicate range), how to slice them (interval aligned to the anchor),
/// and how far back the bucketed window reaches.
///
/// Derived purely from the timeline kind and `now`; recomputed on every
/// query invocation rather than cached.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSpec {
    pub timeline: Timeline,
    pub predicate_start: DateTime<Utc>,
    pub predicate_end: DateTime<Utc>,
    pub anchor: DateTime<Utc>,
    pub bucket_interval: Duration,
    pub window_start: DateTime<Utc>,
}

// The daily anchor sits a fixed number of days behind today's midnight so
// the seven daily buckets line up with the front of the window.
const DAILY_ANCHOR_OFFSET_DAYS: i64 = 6;

/// Resolve the window parameters for a timeline at a given instant.
///
/// Note the monthly window intentionally pairs a 7-day predicate with
/// 30-day buckets over a 90-day span; that mismatch is inherited behavior
/// and is kept as-is pending a product decision.
pub fn resolve(timeline: Timeline, now: DateTime<Utc>) -> WindowSpec {
    let today = start_of_day(now);

    match timeline {
        Timeline::Daily => WindowSpec {
            timeline,
            predicate_start: now - Duration::days(7),
            predicate_end: now,
            anchor: today - Duration::days(DAILY_ANCHOR_OFFSET_DAYS),
            bucket_interval: Duration::days(1),
            window_start: now - Duration::days(7),
        },
        Timeline::Weekly => WindowSpec {
            timeline,
            predicate_start: now - Duration::days(28),
            predicate_end: now,
            anchor: today,
            bucket_interval: Duration::days(7),
            window_start: now - Duration::days(28),
        },
        Timeline::Monthly => WindowSpec {
            timeline,
            predicate_start: now - Duration::days(7),
            predicate_end: now,
            anchor: today,
            bucket_interval: Duration::days(30),
            window_start: now - Duration::days(90),
        },
    }
}

fn start_of_day(at: DateTime<Utc>) -> DateTime<Utc> {
    at.date_naive()
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always a valid time")
        .and_utc()
}
