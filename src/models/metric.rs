use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// A health quantity metric tracked by the store.
///
/// Each kind has a fixed base unit in which raw sample values are stored:
/// walking speed in m/s, step count as a plain count, distance in meters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum MetricKind {
    WalkingSpeed,
    StepCount,
    DistanceWalkingRunning,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::WalkingSpeed => "WalkingSpeed",
            MetricKind::StepCount => "StepCount",
            MetricKind::DistanceWalkingRunning => "DistanceWalkingRunning",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "WalkingSpeed" => Ok(MetricKind::WalkingSpeed),
            "StepCount" => Ok(MetricKind::StepCount),
            "DistanceWalkingRunning" => Ok(MetricKind::DistanceWalkingRunning),
            other => Err(anyhow!("unknown metric kind '{other}'")),
        }
    }
}
