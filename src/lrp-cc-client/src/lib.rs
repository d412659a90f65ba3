//! Authenticated mutual-TLS HTTP client for the three CC endpoints the
//! watcher forwards lifecycle events to.
//!
//! No retry is performed here: retry policy belongs to the caller, and the
//! watcher's policy (§4.E) is to log and drop on failure, since CC's
//! handlers are idempotent.

mod requests;
mod tls;

pub use requests::{AppCrashedRequest, AppReadinessChangedRequest, AppReschedulingRequest};
pub use tls::{ClientTlsConfig, TlsConfigFactory, TlsInitError};

use lrp_types::ProcessGuid;

/// Failure modes for a single CC call.
#[derive(Debug, thiserror::Error)]
pub enum CcClientError {
    #[error("transport error calling CC: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("CC responded with unexpected status {status}")]
    BadResponse { status: u16 },
}

/// An authenticated client for CC's internal lifecycle-event endpoints.
pub struct CcClient {
    base_url: String,
    client: reqwest::Client,
    readiness_changed_path_template: String,
}

impl CcClient {
    /// Builds a client whose underlying `reqwest::Client` presents the
    /// given TLS identity and pins the given root CA.
    pub fn new(base_url: impl Into<String>, tls: ClientTlsConfig) -> Result<CcClient, TlsInitError> {
        let client = reqwest::Client::builder()
            .identity(tls.identity)
            .add_root_certificate(tls.root_ca)
            .build()
            .map_err(TlsInitError::InvalidIdentity)?;
        Ok(CcClient {
            base_url: base_url.into(),
            client,
            readiness_changed_path_template: "/internal/v4/apps/{guid}/readiness_changed".into(),
        })
    }

    /// Overrides the readiness-changed endpoint's path template.
    pub fn with_readiness_changed_path(mut self, template: impl Into<String>) -> CcClient {
        self.readiness_changed_path_template = template.into();
        self
    }

    async fn post(&self, path: &str, body: &impl serde::Serialize) -> Result<(), CcClientError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.post(url).json(body).send().await?;
        let status = response.status();
        if status.as_u16() == 200 {
            Ok(())
        } else {
            Err(CcClientError::BadResponse { status: status.as_u16() })
        }
    }

    /// `POST /internal/v4/apps/{guid}/crashed`.
    pub async fn app_crashed(
        &self,
        guid: &ProcessGuid,
        req: AppCrashedRequest,
    ) -> Result<(), CcClientError> {
        self.post(&format!("/internal/v4/apps/{guid}/crashed"), &req).await
    }

    /// `POST /internal/v4/apps/{guid}/rescheduling`.
    pub async fn app_rescheduling(
        &self,
        guid: &ProcessGuid,
        req: AppReschedulingRequest,
    ) -> Result<(), CcClientError> {
        self.post(&format!("/internal/v4/apps/{guid}/rescheduling"), &req).await
    }

    /// `POST` to the configured readiness-changed path for `guid`.
    pub async fn app_readiness_changed(
        &self,
        guid: &ProcessGuid,
        req: AppReadinessChangedRequest,
    ) -> Result<(), CcClientError> {
        let path = self.readiness_changed_path_template.replace("{guid}", guid.as_str());
        self.post(&path, &req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn insecure_client(base_url: String) -> CcClient {
        // Unit tests exercise request shaping and status mapping against a
        // plain-HTTP wiremock server; TLS material construction is covered
        // separately by `tls::tests`.
        CcClient {
            base_url,
            client: reqwest::Client::new(),
            readiness_changed_path_template: "/internal/v4/apps/{guid}/readiness_changed".into(),
        }
    }

    #[tokio::test]
    async fn app_crashed_round_trips_exactly_seven_fields() {
        let server = MockServer::start().await;
        let guid: ProcessGuid = "p1".parse().unwrap();
        let expected_body = serde_json::json!({
            "instance": "i1",
            "index": 2,
            "cell_id": "c1",
            "reason": "CRASHED",
            "exit_description": "oom",
            "crash_count": 3,
            "crash_timestamp": 1_700_000_000_000_000_000i64,
        });

        Mock::given(method("POST"))
            .and(path("/internal/v4/apps/p1/crashed"))
            .and(body_json(&expected_body))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = insecure_client(server.uri());
        let result = client
            .app_crashed(
                &guid,
                AppCrashedRequest {
                    instance: "i1".into(),
                    index: 2,
                    cell_id: "c1".into(),
                    reason: "CRASHED".into(),
                    exit_description: "oom".into(),
                    crash_count: 3,
                    crash_timestamp: 1_700_000_000_000_000_000,
                },
            )
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn non_200_status_is_a_bad_response_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/internal/v4/apps/p1/rescheduling"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = insecure_client(server.uri());
        let guid: ProcessGuid = "p1".parse().unwrap();
        let result = client
            .app_rescheduling(
                &guid,
                AppReschedulingRequest {
                    instance: "i".into(),
                    index: 0,
                    cell_id: "c".into(),
                    reason: "r".into(),
                },
            )
            .await;
        match result {
            Err(CcClientError::BadResponse { status }) => assert_eq!(status, 500),
            other => panic!("expected BadResponse, got {other:?}"),
        }
    }
}
