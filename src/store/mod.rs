//! Sqlite-backed sample store with a live change feed.
//!
//! Raw samples live in a single `samples` table behind a worker-thread
//! `Database`. Every successful write broadcasts a [`SampleChange`] so
//! running statistics queries can recompute their buckets.

mod connection;
mod helpers;
mod migrations;
mod samples;

pub use connection::Database;

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use anyhow::Result;
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use crate::models::{MetricKind, QuantitySample};

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Notification that samples for a metric changed.
#[derive(Debug, Clone, Copy)]
pub struct SampleChange {
    pub metric: MetricKind,
}

struct AuthorizationState {
    granted: HashSet<MetricKind>,
    denied: HashSet<MetricKind>,
}

#[derive(Clone)]
pub struct SampleStore {
    db: Database,
    changes: broadcast::Sender<SampleChange>,
    authorization: Arc<RwLock<AuthorizationState>>,
}

impl SampleStore {
    pub fn open(db_path: PathBuf) -> Result<Self> {
        let db = Database::new(db_path)?;
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);

        Ok(Self {
            db,
            changes,
            authorization: Arc::new(RwLock::new(AuthorizationState {
                granted: HashSet::new(),
                denied: HashSet::new(),
            })),
        })
    }

    pub fn path(&self) -> &Path {
        self.db.path()
    }

    /// Request read access for a set of metrics. Returns false when any
    /// requested metric is refused by the embedder policy; refused metrics
    /// never produce query data.
    pub async fn request_authorization(&self, metrics: &[MetricKind]) -> Result<bool> {
        let mut state = self
            .authorization
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut all_granted = true;
        for metric in metrics {
            if state.denied.contains(metric) {
                all_granted = false;
            } else {
                state.granted.insert(*metric);
            }
        }

        Ok(all_granted)
    }

    pub fn is_authorized(&self, metric: MetricKind) -> bool {
        self.authorization
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .granted
            .contains(&metric)
    }

    /// Embedder policy hook: metrics listed here refuse authorization until
    /// the restriction is lifted by a fresh store.
    pub fn deny_metrics(&self, metrics: &[MetricKind]) {
        let mut state = self
            .authorization
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        for metric in metrics {
            state.denied.insert(*metric);
            state.granted.remove(metric);
        }
    }

    /// Insert a sample and notify live subscriptions.
    pub async fn save_sample(&self, sample: &QuantitySample) -> Result<()> {
        self.db.insert_sample(sample).await?;

        // A send error only means no query is currently listening.
        let _ = self.changes.send(SampleChange {
            metric: sample.metric,
        });

        Ok(())
    }

    pub async fn samples_between(
        &self,
        metric: MetricKind,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<QuantitySample>> {
        self.db.samples_between(metric, start, end).await
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SampleChange> {
        self.changes.subscribe()
    }
}
