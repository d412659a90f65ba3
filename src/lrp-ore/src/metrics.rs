//! A process-wide Prometheus registry, in the shape of `mz_ore::metrics`.

use prometheus::{Encoder, Registry, TextEncoder};

/// Wraps a [`prometheus::Registry`] so components register their metrics
/// into one place, and the internal HTTP server can render them all under
/// `/metrics` with a single call.
#[derive(Clone, Default)]
pub struct MetricsRegistry {
    inner: Registry,
}

impl MetricsRegistry {
    /// Creates an empty registry.
    pub fn new() -> MetricsRegistry {
        MetricsRegistry::default()
    }

    /// Returns the underlying [`prometheus::Registry`] for metric
    /// registration (counters, gauges, histograms).
    pub fn registry(&self) -> &Registry {
        &self.inner
    }

    /// Renders all registered metrics in the Prometheus text exposition
    /// format.
    pub fn encode_text(&self) -> Result<String, anyhow::Error> {
        let metric_families = self.inner.gather();
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
