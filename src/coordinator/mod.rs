//! Three-timeline coordinator.
//!
//! Owns the presentation store and runs one statistics query per timeline.
//! Every slot update is marshaled through a single dispatch task, so the
//! store has exactly one thread of mutation and timeline updates can race
//! without corrupting each other's slots.

use std::sync::{Arc, RwLock};

use anyhow::Result;
use log::info;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::engine::{self, QueryHandle, UpdateCallback};
use crate::models::{BucketValue, MetricKind, Timeline};
use crate::presentation::{PresentationSnapshot, PresentationStore};
use crate::store::SampleStore;
use crate::units::statistics_options;
use crate::window::{resolve, Clock};

/// Callback fired after any slot write. Each timeline fires it independently
/// at its own rate; treat every call as "re-render everything".
pub type AnyUpdateCallback = Box<dyn FnMut() + Send>;

struct ActiveTimelines {
    handles: Vec<QueryHandle>,
    dispatch: JoinHandle<()>,
    dispatch_cancel: CancellationToken,
}

pub struct TimelineCoordinator {
    store: SampleStore,
    clock: Clock,
    presentation: Arc<RwLock<PresentationStore>>,
    active: Mutex<Option<ActiveTimelines>>,
}

impl TimelineCoordinator {
    pub fn new(store: SampleStore) -> Self {
        Self::with_clock(store, Clock::System)
    }

    pub fn with_clock(store: SampleStore, clock: Clock) -> Self {
        Self {
            store,
            clock,
            presentation: Arc::new(RwLock::new(PresentationStore::new())),
            active: Mutex::new(None),
        }
    }

    /// Launch the three timeline queries for one metric. A coordinator that
    /// is already running is stopped first.
    ///
    /// Authorization denial is silent: no slot ever populates and the empty
    /// state stays visible.
    pub async fn start(
        &self,
        metric: MetricKind,
        mut on_any_update: AnyUpdateCallback,
    ) -> Result<()> {
        self.stop().await;

        let granted = self.store.request_authorization(&[metric]).await?;
        if !granted {
            info!(
                "authorization refused for {}; timelines stay empty",
                metric.as_str()
            );
        }

        let (tx, mut rx) = mpsc::unbounded_channel::<(usize, Vec<BucketValue>)>();
        let mode = statistics_options(metric);

        let mut handles = Vec::with_capacity(Timeline::ALL.len());
        for timeline in Timeline::ALL {
            let spec = resolve(timeline, self.clock.now());
            let slot = timeline.slot_index();
            let slot_tx = tx.clone();
            let callback: UpdateCallback = Box::new(move |values| {
                let _ = slot_tx.send((slot, values));
            });

            handles.push(engine::execute(
                self.store.clone(),
                metric,
                spec,
                mode,
                self.clock,
                callback,
            ));
        }
        drop(tx);

        let dispatch_cancel = CancellationToken::new();
        let dispatch_token = dispatch_cancel.clone();
        let presentation = Arc::clone(&self.presentation);

        let dispatch = tokio::spawn(async move {
            loop {
                let (slot, values) = tokio::select! {
                    biased;
                    _ = dispatch_token.cancelled() => break,
                    message = rx.recv() => match message {
                        Some(message) => message,
                        None => break,
                    },
                };

                {
                    let mut store = presentation
                        .write()
                        .unwrap_or_else(|poisoned| poisoned.into_inner());
                    store.apply(slot, values);
                }
                on_any_update();
            }
        });

        *self.active.lock().await = Some(ActiveTimelines {
            handles,
            dispatch,
            dispatch_cancel,
        });

        info!("timeline coordinator started for {}", metric.as_str());
        Ok(())
    }

    /// Cancel all three queries and the dispatch task. Safe to call when
    /// nothing is running, and safe to call repeatedly.
    pub async fn stop(&self) {
        let Some(active) = self.active.lock().await.take() else {
            return;
        };

        // Cancel dispatch first so messages already queued by the engines
        // can no longer reach the presentation store.
        active.dispatch_cancel.cancel();
        for handle in &active.handles {
            handle.cancel();
        }

        let _ = active.dispatch.await;
        info!("timeline coordinator stopped");
    }

    pub fn snapshot(&self) -> PresentationSnapshot {
        self.presentation
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .snapshot()
    }

    pub fn is_empty(&self) -> bool {
        self.presentation
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_empty()
    }

    pub fn section_count(&self) -> usize {
        self.presentation
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .section_count()
    }

    pub fn row_count(&self, section: usize) -> usize {
        self.presentation
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .row_count(section)
    }

    pub fn row(&self, section: usize, row: usize) -> Option<BucketValue> {
        self.presentation
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .row(section, row)
            .cloned()
    }

    pub fn section_title(&self, section: usize) -> Option<&'static str> {
        Timeline::from_slot(section).map(|t| t.title())
    }
}
