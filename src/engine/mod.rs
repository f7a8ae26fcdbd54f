//! Statistics query engine.
//!
//! `execute` runs one long-lived query task per call: an initial bucketed
//! aggregation over the window, then a recompute on every relevant sample
//! change. Each delivery is a complete replacement list for the window,
//! never a delta.

use chrono::{DateTime, Utc};
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

use crate::models::{BucketValue, MetricKind, QuantitySample};
use crate::store::SampleStore;
use crate::units::{convert_to_preferred, AggregationMode};
use crate::window::{resolve, Clock, WindowSpec};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

/// Callback invoked with the full bucket list after every (re)computation.
pub type UpdateCallback = Box<dyn FnMut(Vec<BucketValue>) + Send>;

/// Handle to a running statistics query. Cancelling stops the subscription;
/// no callback fires after cancellation. Cancelling twice is a no-op.
pub struct QueryHandle {
    cancel: CancellationToken,
}

impl QueryHandle {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Start a statistics query for one timeline window.
///
/// Authorization denial and store errors are swallowed: the callback simply
/// never fires for that attempt and the caller sees "no data yet".
pub fn execute(
    store: SampleStore,
    metric: MetricKind,
    spec: WindowSpec,
    mode: AggregationMode,
    clock: Clock,
    mut on_update: UpdateCallback,
) -> QueryHandle {
    let cancel = CancellationToken::new();
    let token = cancel.clone();

    tokio::spawn(async move {
        if !store.is_authorized(metric) {
            log_info!(
                "query for {} skipped: metric not authorized",
                metric.as_str()
            );
            return;
        }

        // Subscribe before the initial computation so a sample written while
        // we aggregate still triggers a recompute.
        let mut changes = store.subscribe();

        match collect_buckets(&store, metric, &spec, mode).await {
            Ok(buckets) => {
                if token.is_cancelled() {
                    return;
                }
                on_update(buckets);
            }
            Err(err) => {
                log_warn!("initial aggregation for {} failed: {err:?}", metric.as_str());
            }
        }

        loop {
            let relevant = tokio::select! {
                biased;
                _ = token.cancelled() => {
                    log_info!("query for {} cancelled", metric.as_str());
                    break;
                }
                change = changes.recv() => match change {
                    Ok(change) => change.metric == metric,
                    // Missed notifications may have included our metric, so
                    // recompute to be safe.
                    Err(RecvError::Lagged(skipped)) => {
                        log_warn!("change feed lagged by {skipped} notifications");
                        true
                    }
                    Err(RecvError::Closed) => break,
                },
            };

            if !relevant {
                continue;
            }

            // The window tracks "now", so re-resolve it for every recompute.
            let spec = resolve(spec.timeline, clock.now());
            match collect_buckets(&store, metric, &spec, mode).await {
                Ok(buckets) => {
                    if token.is_cancelled() {
                        break;
                    }
                    on_update(buckets);
                }
                Err(err) => {
                    log_warn!("recompute for {} failed: {err:?}", metric.as_str());
                }
            }
        }
    });

    QueryHandle { cancel }
}

async fn collect_buckets(
    store: &SampleStore,
    metric: MetricKind,
    spec: &WindowSpec,
    mode: AggregationMode,
) -> anyhow::Result<Vec<BucketValue>> {
    let samples = store
        .samples_between(metric, spec.predicate_start, spec.predicate_end)
        .await?;
    Ok(aggregate_buckets(&samples, spec, mode, metric))
}

/// Enumerate the bucket boundaries covering `[window_start, predicate_end)`,
/// aligned to the window's anchor.
pub(crate) fn bucket_bounds(spec: &WindowSpec) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
    let interval = spec.bucket_interval;

    // Walk the anchor onto the bucket boundary at or just before the window
    // start. The window spans at most a few dozen intervals.
    let mut start = spec.anchor;
    while start > spec.window_start {
        start = start - interval;
    }
    while start + interval <= spec.window_start {
        start = start + interval;
    }

    let mut bounds = Vec::new();
    while start < spec.predicate_end {
        bounds.push((start, start + interval));
        start = start + interval;
    }

    bounds
}

/// Reduce samples into one value per bucket, converted to the metric's
/// preferred display unit. Empty buckets stay in the list with value 0.0, as
/// does any bucket whose aggregate is not a finite number.
pub(crate) fn aggregate_buckets(
    samples: &[QuantitySample],
    spec: &WindowSpec,
    mode: AggregationMode,
    metric: MetricKind,
) -> Vec<BucketValue> {
    bucket_bounds(spec)
        .into_iter()
        .map(|(start, end)| {
            let values: Vec<f64> = samples
                .iter()
                .filter(|s| s.timestamp >= start && s.timestamp < end)
                .map(|s| s.value)
                .collect();

            if values.is_empty() {
                return BucketValue::empty(start, end);
            }

            let converted = convert_to_preferred(reduce(&values, mode), metric);
            BucketValue {
                bucket_start: start,
                bucket_end: end,
                value: if converted.is_finite() { converted } else { 0.0 },
            }
        })
        .collect()
}

fn reduce(values: &[f64], mode: AggregationMode) -> f64 {
    match mode {
        AggregationMode::Sum => values.iter().sum(),
        AggregationMode::Average => values.iter().sum::<f64>() / values.len() as f64,
        AggregationMode::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
        AggregationMode::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Timeline;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 5, 14, 0, 0, 0).unwrap()
    }

    fn sample_at(metric: MetricKind, at: DateTime<Utc>, value: f64) -> QuantitySample {
        QuantitySample::new(metric, at, value)
    }

    #[test]
    fn daily_window_yields_seven_buckets() {
        let spec = resolve(Timeline::Daily, fixed_now());
        let bounds = bucket_bounds(&spec);
        assert_eq!(bounds.len(), 7);
        assert_eq!(bounds[0].0, Utc.with_ymd_and_hms(2021, 5, 7, 0, 0, 0).unwrap());
        assert_eq!(bounds[6].1, fixed_now());
    }

    #[test]
    fn weekly_window_yields_four_buckets() {
        let spec = resolve(Timeline::Weekly, fixed_now());
        let bounds = bucket_bounds(&spec);
        assert_eq!(bounds.len(), 4);
        assert_eq!(
            bounds[0].0,
            Utc.with_ymd_and_hms(2021, 4, 16, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn monthly_window_yields_three_buckets() {
        let spec = resolve(Timeline::Monthly, fixed_now());
        let bounds = bucket_bounds(&spec);
        assert_eq!(bounds.len(), 3);
        assert_eq!(bounds[2].1, fixed_now());
    }

    #[test]
    fn buckets_are_contiguous() {
        for timeline in Timeline::ALL {
            let spec = resolve(timeline, fixed_now());
            let bounds = bucket_bounds(&spec);
            for pair in bounds.windows(2) {
                assert_eq!(pair[0].1, pair[1].0);
            }
        }
    }

    #[test]
    fn average_of_two_speed_samples() {
        let spec = resolve(Timeline::Daily, fixed_now());
        let day = Utc.with_ymd_and_hms(2021, 5, 10, 8, 0, 0).unwrap();
        let samples = vec![
            sample_at(MetricKind::WalkingSpeed, day, 1.2),
            sample_at(MetricKind::WalkingSpeed, day, 1.4),
        ];

        let buckets = aggregate_buckets(
            &samples,
            &spec,
            AggregationMode::Average,
            MetricKind::WalkingSpeed,
        );

        let bucket = buckets
            .iter()
            .find(|b| b.bucket_start == Utc.with_ymd_and_hms(2021, 5, 10, 0, 0, 0).unwrap())
            .expect("bucket covering 2021-05-10");
        assert!((bucket.value - 1.3).abs() < 1e-9);
    }

    #[test]
    fn empty_buckets_stay_present_with_zero() {
        let spec = resolve(Timeline::Daily, fixed_now());
        let buckets = aggregate_buckets(
            &[],
            &spec,
            AggregationMode::Average,
            MetricKind::WalkingSpeed,
        );
        assert_eq!(buckets.len(), 7);
        assert!(buckets.iter().all(|b| b.value == 0.0));
    }

    #[test]
    fn sum_matches_direct_computation_per_bucket() {
        let spec = resolve(Timeline::Weekly, fixed_now());
        let samples: Vec<QuantitySample> = (0..20)
            .map(|i| {
                sample_at(
                    MetricKind::StepCount,
                    fixed_now() - chrono::Duration::hours(i * 30 + 1),
                    (i as f64) * 3.0 + 1.0,
                )
            })
            .collect();

        let buckets =
            aggregate_buckets(&samples, &spec, AggregationMode::Sum, MetricKind::StepCount);

        for bucket in &buckets {
            let expected: f64 = samples
                .iter()
                .filter(|s| s.timestamp >= bucket.bucket_start && s.timestamp < bucket.bucket_end)
                .map(|s| s.value)
                .sum();
            assert!((bucket.value - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn non_finite_aggregate_is_recorded_as_zero() {
        let spec = resolve(Timeline::Daily, fixed_now());
        let day = Utc.with_ymd_and_hms(2021, 5, 10, 8, 0, 0).unwrap();
        let samples = vec![sample_at(MetricKind::WalkingSpeed, day, f64::INFINITY)];

        let buckets = aggregate_buckets(
            &samples,
            &spec,
            AggregationMode::Average,
            MetricKind::WalkingSpeed,
        );
        let bucket = buckets
            .iter()
            .find(|b| b.bucket_start <= day && day < b.bucket_end)
            .unwrap();
        assert_eq!(bucket.value, 0.0);
    }

    #[test]
    fn min_and_max_reductions() {
        let values = [3.0, 1.0, 2.0];
        assert_eq!(reduce(&values, AggregationMode::Min), 1.0);
        assert_eq!(reduce(&values, AggregationMode::Max), 3.0);
    }
}
