//! Consumes the BBS instance-event subscription, classifies each event,
//! and forwards the resulting CC calls over a bounded worker pool.
//!
//! The run loop is a direct descendant of the teacher's
//! rehydration-task split: a small state enum, one `tokio::select!` per
//! iteration, and a dedicated resubscribe path — renamed here to match
//! this component's own states (`Subscribing`/`Reading`/`Resubscribing`/
//! `Stopping`) rather than reusing the storage controller's vocabulary.

mod classify;
pub mod metrics;
mod pool;

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use lrp_bbs_client::{BbsClient, EventSource, EventSourceError};
use lrp_cc_client::CcClient;

use classify::{classify, CcJob};
use metrics::WatcherMetrics;
use pool::WorkerPool;

/// Tunables for [`Watcher::run`]. Defaults match the original service's
/// documented defaults.
#[derive(Debug, Clone, Copy)]
pub struct WatcherConfig {
    /// Number of concurrent CC-call workers.
    pub worker_pool_size: usize,
    /// Pause before retrying `next()` after a non-fatal error.
    pub retry_pause_interval: Duration,
    /// Number of consecutive non-fatal `next()` errors tolerated before the
    /// watcher forces a resubscribe. Ported from the original's
    /// `nextErrCount` threshold.
    pub max_consecutive_next_errors: u32,
}

impl Default for WatcherConfig {
    fn default() -> WatcherConfig {
        WatcherConfig {
            worker_pool_size: 500,
            retry_pause_interval: Duration::from_secs(1),
            max_consecutive_next_errors: 3,
        }
    }
}

enum WatcherState {
    Subscribing,
    Reading,
    Resubscribing,
    Stopping,
}

/// Owns the BBS and CC clients for the lifetime of a single watch loop.
pub struct Watcher {
    bbs: Arc<BbsClient>,
    cc: Arc<CcClient>,
    config: WatcherConfig,
    metrics: Option<Arc<WatcherMetrics>>,
}

impl Watcher {
    pub fn new(bbs: BbsClient, cc: CcClient, config: WatcherConfig) -> Watcher {
        Watcher { bbs: Arc::new(bbs), cc: Arc::new(cc), config, metrics: None }
    }

    pub fn with_metrics(mut self, metrics: WatcherMetrics) -> Watcher {
        self.metrics = Some(Arc::new(metrics));
        self
    }

    /// Runs the watch loop until `cancel` is cancelled. Always returns
    /// cleanly: subscription and `next()` failures are retried internally
    /// and never propagate out of this call.
    pub async fn run(&self, cancel: CancellationToken) {
        tracing::info!("watcher starting");
        let (pool, worker_handles) = WorkerPool::new(self.config.worker_pool_size);
        let mut state = WatcherState::Subscribing;
        let mut source: Option<EventSource> = None;
        let mut consecutive_errors = 0u32;

        loop {
            state = match state {
                WatcherState::Subscribing => self.step_subscribe(&cancel, &mut source).await,
                WatcherState::Reading => {
                    self.step_read(&cancel, &mut source, &pool, &mut consecutive_errors).await
                }
                WatcherState::Resubscribing => {
                    if let Some(source) = source.take() {
                        source.close();
                    }
                    consecutive_errors = 0;
                    if let Some(metrics) = &self.metrics {
                        metrics.resubscriptions.inc();
                    }
                    WatcherState::Subscribing
                }
                WatcherState::Stopping => break,
            };
        }

        if let Some(source) = source.take() {
            source.close();
        }
        drop(pool);
        for handle in worker_handles {
            let _ = handle.await;
        }
        tracing::info!("watcher stopped");
    }

    async fn step_subscribe(
        &self,
        cancel: &CancellationToken,
        source: &mut Option<EventSource>,
    ) -> WatcherState {
        if cancel.is_cancelled() {
            return WatcherState::Stopping;
        }
        tracing::info!("subscribing to instance events");
        *source = Some(self.bbs.subscribe_instance_events());
        WatcherState::Reading
    }

    async fn step_read(
        &self,
        cancel: &CancellationToken,
        source: &mut Option<EventSource>,
        pool: &WorkerPool,
        consecutive_errors: &mut u32,
    ) -> WatcherState {
        let active = source.as_mut().expect("Reading state always holds a subscription");
        tokio::select! {
            biased;
            _ = cancel.cancelled() => WatcherState::Stopping,
            result = active.next() => match result {
                Ok(event) => {
                    *consecutive_errors = 0;
                    self.dispatch(pool, event).await;
                    WatcherState::Reading
                }
                Err(EventSourceError::SourceClosed) => {
                    tracing::debug!("event source closed, resubscribing");
                    WatcherState::Resubscribing
                }
                Err(EventSourceError::UnrecognizedEventType) => {
                    tracing::debug!("received unrecognized event type, continuing");
                    WatcherState::Reading
                }
                Err(EventSourceError::Other(error)) => {
                    *consecutive_errors += 1;
                    tracing::warn!(%error, consecutive_errors = *consecutive_errors, "error reading next event");
                    if *consecutive_errors >= self.config.max_consecutive_next_errors {
                        WatcherState::Resubscribing
                    } else {
                        tokio::time::sleep(self.config.retry_pause_interval).await;
                        WatcherState::Reading
                    }
                }
            },
        }
    }

    async fn dispatch(&self, pool: &WorkerPool, event: lrp_types::BbsEvent) {
        let Some(job) = classify(event) else {
            if let Some(metrics) = &self.metrics {
                metrics.events_classified.with_label_values(&["dropped"]).inc();
            }
            return;
        };
        if let Some(metrics) = &self.metrics {
            metrics.events_classified.with_label_values(&["submitted"]).inc();
        }
        let cc = Arc::clone(&self.cc);
        let future: std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>> =
            Box::pin(async move { run_job(cc, job).await });
        if pool.submit(future).await.is_err() {
            tracing::error!("worker pool closed, dropping CC call");
        }
    }
}

async fn run_job(cc: Arc<CcClient>, job: CcJob) {
    match job {
        CcJob::Crashed { guid, request } => {
            if let Err(error) = cc.app_crashed(&guid, request).await {
                tracing::warn!(%guid, %error, "failed recording app crashed");
            }
        }
        CcJob::Rescheduling { guid, request } => {
            if let Err(error) = cc.app_rescheduling(&guid, request).await {
                tracing::warn!(%guid, %error, "failed recording evacuating app instance");
            }
        }
        CcJob::ReadinessChanged { guid, request } => {
            if let Err(error) = cc.app_readiness_changed(&guid, request).await {
                tracing::warn!(%guid, %error, "failed recording app readiness changed");
            }
        }
    }
}
