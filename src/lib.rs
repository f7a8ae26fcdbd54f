//! paceline: time-windowed health statistics aggregation.
//!
//! Raw quantity samples (walking speed, steps, distance) stream into a
//! sqlite-backed [`store::SampleStore`]. The [`coordinator::TimelineCoordinator`]
//! runs one live statistics query per timeline (daily, weekly, monthly),
//! keeps the bucketed aggregates current as samples arrive, and exposes
//! them as three independently sorted lists for a list-style UI.

pub mod coordinator;
pub mod engine;
pub mod models;
pub mod presentation;
pub mod store;
pub mod units;
mod utils;
pub mod window;

pub use coordinator::TimelineCoordinator;
pub use engine::{QueryHandle, UpdateCallback};
pub use models::{BucketValue, MetricKind, QuantitySample, Timeline};
pub use presentation::{PresentationSnapshot, PresentationStore};
pub use store::{SampleChange, SampleStore};
pub use units::{formatted_value, preferred_unit, statistics_options, AggregationMode, Unit};
pub use window::{resolve, Clock, WindowSpec};
