//! Listener-owned counters registered into the process [`MetricsRegistry`].

use prometheus::{IntCounterVec, Opts};

use lrp_ore::metrics::MetricsRegistry;

pub struct ListenerMetrics {
    pub requests_total: IntCounterVec,
}

impl ListenerMetrics {
    pub fn register(registry: &MetricsRegistry) -> ListenerMetrics {
        let requests_total = IntCounterVec::new(
            Opts::new("lrp_listener_requests_total", "Listener requests by admission outcome and status code"),
            &["outcome", "status"],
        )
        .expect("static metric options are well-formed");

        registry
            .registry()
            .register(Box::new(requests_total.clone()))
            .expect("metric name is registered exactly once");

        ListenerMetrics { requests_total }
    }
}
