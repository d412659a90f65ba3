//! Shared handler state: the BBS/metrics clients, the admission semaphore,
//! and the bulk fan-out worker count. Threaded into every axum handler via
//! `State<ListenerState>`, the conventional way to share service objects
//! across an axum router.

use std::sync::Arc;

use tokio::sync::Semaphore;

use lrp_bbs_client::BbsClient;
use lrp_metrics_client::MetricsClient;

use crate::metrics::ListenerMetrics;

#[derive(Clone)]
pub struct ListenerState {
    pub bbs: Arc<BbsClient>,
    pub metrics: Arc<MetricsClient>,
    /// Sized `M`: the global in-flight request cap (§4.F).
    pub admission: Arc<Semaphore>,
    /// `B`: the per-request bulk fan-out worker count (§4.F).
    pub bulk_workers: usize,
    /// The conventional container-side port `Host`/`Port` is derived from.
    pub default_container_port: u16,
    /// Prometheus counters for this listener instance; absent in tests that
    /// don't register a [`lrp_ore::metrics::MetricsRegistry`].
    pub process_metrics: Option<Arc<ListenerMetrics>>,
}
