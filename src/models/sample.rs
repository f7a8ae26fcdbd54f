use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::MetricKind;

/// A single raw measurement as recorded by the sample store.
///
/// Samples are immutable once written; updates arrive as new samples, never
/// as edits to existing rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantitySample {
    pub id: String,
    pub metric: MetricKind,
    pub timestamp: DateTime<Utc>,
    /// Value in the metric's base unit (m/s, count, or meters).
    pub value: f64,
}

impl QuantitySample {
    pub fn new(metric: MetricKind, timestamp: DateTime<Utc>, value: f64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            metric,
            timestamp,
            value,
        }
    }
}
