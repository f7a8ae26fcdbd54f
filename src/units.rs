//! Display-unit preferences and the metric-to-aggregation lookup.
//!
//! Raw samples are stored in base units (m/s, count, meters); the engine
//! converts each bucket aggregate into the metric's preferred display unit
//! before it reaches the presentation store.

use crate::models::MetricKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    MetersPerSecond,
    Count,
    Kilometers,
}

impl Unit {
    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::MetersPerSecond => "m/s",
            Unit::Count => "steps",
            Unit::Kilometers => "km",
        }
    }
}

/// How samples within a bucket are reduced to a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationMode {
    Sum,
    Average,
    Min,
    Max,
}

/// Lookup table from metric semantics to reduction function: rate-like
/// metrics average, cumulative metrics sum.
pub fn statistics_options(metric: MetricKind) -> AggregationMode {
    match metric {
        MetricKind::WalkingSpeed => AggregationMode::Average,
        MetricKind::StepCount => AggregationMode::Sum,
        MetricKind::DistanceWalkingRunning => AggregationMode::Sum,
    }
}

pub fn preferred_unit(metric: MetricKind) -> Unit {
    match metric {
        MetricKind::WalkingSpeed => Unit::MetersPerSecond,
        MetricKind::StepCount => Unit::Count,
        MetricKind::DistanceWalkingRunning => Unit::Kilometers,
    }
}

/// Convert a value from the metric's base unit into its preferred unit.
pub fn convert_to_preferred(value: f64, metric: MetricKind) -> f64 {
    match preferred_unit(metric) {
        Unit::MetersPerSecond | Unit::Count => value,
        Unit::Kilometers => value / 1000.0,
    }
}

pub fn formatted_value(value: f64, metric: MetricKind) -> String {
    let unit = preferred_unit(metric);
    match unit {
        Unit::Count => format!("{:.0} {}", value, unit.symbol()),
        _ => format!("{:.2} {}", value, unit.symbol()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_metrics_average_and_cumulative_metrics_sum() {
        assert_eq!(
            statistics_options(MetricKind::WalkingSpeed),
            AggregationMode::Average
        );
        assert_eq!(statistics_options(MetricKind::StepCount), AggregationMode::Sum);
        assert_eq!(
            statistics_options(MetricKind::DistanceWalkingRunning),
            AggregationMode::Sum
        );
    }

    #[test]
    fn distance_converts_meters_to_kilometers() {
        assert_eq!(
            convert_to_preferred(2500.0, MetricKind::DistanceWalkingRunning),
            2.5
        );
        assert_eq!(convert_to_preferred(1.3, MetricKind::WalkingSpeed), 1.3);
    }

    #[test]
    fn formatted_value_carries_unit_symbol() {
        assert_eq!(
            formatted_value(1.345, MetricKind::WalkingSpeed),
            "1.35 m/s"
        );
        assert_eq!(formatted_value(5421.0, MetricKind::StepCount), "5421 steps");
    }
}
