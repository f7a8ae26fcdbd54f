pub mod bucket;
pub mod metric;
pub mod sample;
pub mod timeline;

pub use bucket::BucketValue;
pub use metric::MetricKind;
pub use sample::QuantitySample;
pub use timeline::Timeline;
