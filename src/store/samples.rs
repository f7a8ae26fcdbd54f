use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::params;

use super::{
    connection::Database,
    helpers::{parse_datetime, parse_metric},
};
use crate::models::{MetricKind, QuantitySample};

impl Database {
    pub async fn insert_sample(&self, sample: &QuantitySample) -> Result<()> {
        let record = sample.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO samples (id, metric, timestamp, value, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    record.id,
                    record.metric.as_str(),
                    record.timestamp.to_rfc3339(),
                    record.value,
                    Utc::now().to_rfc3339(),
                ],
            )
            .with_context(|| "failed to insert sample")?;
            Ok(())
        })
        .await
    }

    /// Samples for one metric with `start <= timestamp < end`, oldest first.
    pub async fn samples_between(
        &self,
        metric: MetricKind,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<QuantitySample>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, metric, timestamp, value
                 FROM samples
                 WHERE metric = ?1 AND timestamp >= ?2 AND timestamp < ?3
                 ORDER BY timestamp ASC",
            )?;

            let mut rows = stmt.query(params![
                metric.as_str(),
                start.to_rfc3339(),
                end.to_rfc3339(),
            ])?;

            let mut samples = Vec::new();
            while let Some(row) = rows.next()? {
                samples.push(QuantitySample {
                    id: row.get(0)?,
                    metric: parse_metric(&row.get::<_, String>(1)?)?,
                    timestamp: parse_datetime(&row.get::<_, String>(2)?, "sample timestamp")?,
                    value: row.get(3)?,
                });
            }

            Ok(samples)
        })
        .await
    }
}
