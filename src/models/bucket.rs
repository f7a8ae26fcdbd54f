use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One aggregated value for a fixed-duration sub-interval of a timeline
/// window.
///
/// Bucket lists are always replaced wholesale; individual entries are never
/// patched after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketValue {
    pub bucket_start: DateTime<Utc>,
    pub bucket_end: DateTime<Utc>,
    /// Aggregate in the metric's preferred display unit. A bucket with no
    /// samples records 0.0, which is indistinguishable from a measured zero.
    pub value: f64,
}

impl BucketValue {
    pub fn empty(bucket_start: DateTime<Utc>, bucket_end: DateTime<Utc>) -> Self {
        Self {
            bucket_start,
            bucket_end,
            value: 0.0,
        }
    }
}
