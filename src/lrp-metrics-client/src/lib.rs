//! A best-effort client for the metrics service (the "traffic controller"
//! in CF/Diego vocabulary).
//!
//! Failure here is *recoverable*: [`MetricsClient::container_metrics`]
//! never returns `Err`. On any transport, status, or decode failure it
//! logs and returns an empty sample set, so the caller's response is still
//! produced (see `LRPStats`'s degraded-response contract).

use serde::Deserialize;

use lrp_types::ContainerMetric;

#[derive(Deserialize)]
struct WireContainerMetric {
    instance_index: u32,
    cpu_percentage: f64,
    memory_bytes: u64,
    disk_bytes: u64,
}

impl From<WireContainerMetric> for ContainerMetric {
    fn from(wire: WireContainerMetric) -> ContainerMetric {
        ContainerMetric {
            instance_index: wire.instance_index,
            cpu_percentage: wire.cpu_percentage,
            memory_bytes: wire.memory_bytes,
            disk_bytes: wire.disk_bytes,
        }
    }
}

/// A client for the per-application container-metrics endpoint.
pub struct MetricsClient {
    base_url: String,
    client: reqwest::Client,
}

impl MetricsClient {
    pub fn new(base_url: impl Into<String>, skip_cert_verify: bool) -> MetricsClient {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(skip_cert_verify)
            .build()
            .expect("reqwest client with only well-formed options should build");
        MetricsClient { base_url: base_url.into(), client }
    }

    /// Fetches container metrics for `log_stream_guid`, authenticated with
    /// `auth_token`. On any failure, logs a warning and returns an empty
    /// list rather than propagating the error.
    pub async fn container_metrics(
        &self,
        log_stream_guid: &str,
        auth_token: &str,
    ) -> Vec<ContainerMetric> {
        match self.fetch(log_stream_guid, auth_token).await {
            Ok(metrics) => metrics,
            Err(error) => {
                tracing::warn!(log_stream_guid, %error, "container metrics unavailable, continuing with empty sample set");
                Vec::new()
            }
        }
    }

    async fn fetch(
        &self,
        log_stream_guid: &str,
        auth_token: &str,
    ) -> Result<Vec<ContainerMetric>, anyhow::Error> {
        let url = format!("{}/apps/{log_stream_guid}/containermetrics", self.base_url);
        let response = self
            .client
            .get(url)
            .header("Authorization", auth_token)
            .send()
            .await?
            .error_for_status()?;
        let wire: Vec<WireContainerMetric> = response.json().await?;
        Ok(wire.into_iter().map(ContainerMetric::from).collect())
    }

    /// Closing is idempotent: the underlying `reqwest::Client` is cheaply
    /// cloneable and needs no explicit teardown, so this is a no-op kept
    /// only to satisfy the "closeable" contract explicitly.
    pub fn close(&self) {}
}
