//! Watcher-owned counters registered into the process [`MetricsRegistry`].

use prometheus::{IntCounter, IntCounterVec, Opts};

use lrp_ore::metrics::MetricsRegistry;

pub struct WatcherMetrics {
    pub events_classified: IntCounterVec,
    pub resubscriptions: IntCounter,
}

impl WatcherMetrics {
    pub fn register(registry: &MetricsRegistry) -> WatcherMetrics {
        let events_classified = IntCounterVec::new(
            Opts::new("lrp_watcher_events_classified_total", "Instance events classified by outcome"),
            &["outcome"],
        )
        .expect("static metric options are well-formed");
        let resubscriptions = IntCounter::new(
            "lrp_watcher_resubscriptions_total",
            "Times the watcher has resubscribed to the instance-event stream",
        )
        .expect("static metric options are well-formed");

        registry
            .registry()
            .register(Box::new(events_classified.clone()))
            .expect("metric name is registered exactly once");
        registry
            .registry()
            .register(Box::new(resubscriptions.clone()))
            .expect("metric name is registered exactly once");

        WatcherMetrics { events_classified, resubscriptions }
    }
}
