//! Typed operations over BBS's desired/actual state API, plus the
//! instance-event subscription.
//!
//! The request/response operations are plain `reqwest` calls; the
//! subscription is different in kind; see [`event_source`] for why it
//! gets its own background task instead of a request/response pair.

mod event_source;
mod wire;

pub use event_source::{EventSource, EventSourceError};

use lrp_types::{ActualInstance, DesiredSpec, ProcessGuid};

/// Failure modes for a single request/response BBS call.
#[derive(Debug, thiserror::Error)]
pub enum BbsError {
    #[error("transport error calling BBS: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("no desired spec for process guid {0}")]
    NotFound(ProcessGuid),
}

/// A client for BBS's desired/actual state reads and its instance-event
/// subscription.
pub struct BbsClient {
    base_url: String,
    client: reqwest::Client,
}

impl BbsClient {
    pub fn new(base_url: impl Into<String>, skip_cert_verify: bool) -> BbsClient {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(skip_cert_verify)
            .build()
            .expect("reqwest client with only well-formed options should build");
        BbsClient { base_url: base_url.into(), client }
    }

    /// `GET /v1/desired_lrp_scheduling_info_by_process_guid` (or similar);
    /// the single-guid lookup.
    pub async fn desired_by_process_guid(
        &self,
        guid: &ProcessGuid,
    ) -> Result<DesiredSpec, BbsError> {
        let url = format!("{}/v1/desired_lrps/{guid}", self.base_url);
        let response = self.client.get(url).send().await?;
        if response.status().as_u16() == 404 {
            return Err(BbsError::NotFound(guid.clone()));
        }
        let spec = response.error_for_status()?.json().await?;
        Ok(spec)
    }

    /// `GET /v1/actual_lrps?process_guid={guid}`.
    pub async fn actual_instances_by_process_guid(
        &self,
        guid: &ProcessGuid,
    ) -> Result<Vec<ActualInstance>, BbsError> {
        let url = format!("{}/v1/actual_lrps?process_guid={guid}", self.base_url);
        let instances = self.client.get(url).send().await?.error_for_status()?.json().await?;
        Ok(instances)
    }

    /// `GET /v1/desired_lrps`, the full snapshot used by rehydration.
    pub async fn list_desired(&self) -> Result<Vec<DesiredSpec>, BbsError> {
        let url = format!("{}/v1/desired_lrps", self.base_url);
        let specs = self.client.get(url).send().await?.error_for_status()?.json().await?;
        Ok(specs)
    }

    /// Opens the instance-event subscription. The returned [`EventSource`]
    /// owns a background task that reconnects on failure; see its
    /// documentation for the consumer contract.
    pub fn subscribe_instance_events(&self) -> EventSource {
        let url = format!("{}/v1/events/actual_lrps", self.base_url);
        EventSource::spawn(self.client.clone(), url)
    }
}
