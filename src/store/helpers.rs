use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::models::MetricKind;

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field}"))
}

pub fn parse_metric(value: &str) -> Result<MetricKind> {
    MetricKind::parse(value).context("failed to parse metric column")
}
