//! The read-only HTTP API (§4.F): three GET endpoints composing BBS and
//! metrics-service state into [`lrp_types::LRPInstanceView`] responses,
//! behind a global admission cap and (for the bulk endpoint) a bounded
//! fan-out.
//!
//! Router construction follows the teacher's own internal-HTTP-server
//! wiring (`other_examples/…clusterd.rs`'s `axum::Router` + `routing::get`)
//! generalized here to the crate's external-facing three-route surface.

mod admission;
mod bulk;
pub mod error;
mod handlers;
pub mod metrics;
pub mod state;

use axum::middleware;
use axum::routing::get;
use axum::Router;

use lrp_types::ProcessGuid;

pub use error::ListenerError;
pub use state::ListenerState;

/// Builds the listener's axum router: the three endpoints plus the
/// admission-control middleware wrapping every route.
pub fn router(state: ListenerState) -> Router {
    Router::new()
        .route("/v1/actual_lrps/:guid", get(handlers::lrp_status))
        .route("/v1/actual_lrps/:guid/stats", get(handlers::lrp_stats))
        .route("/v1/bulk_actual_lrp_status", get(handlers::bulk_lrp_status))
        .layer(middleware::from_fn_with_state(state.clone(), admission::enforce_admission))
        .with_state(state)
}

/// Parses a path guid into a [`ProcessGuid`], treating an unparseable guid
/// as equivalent to "no such process" rather than a distinct validation
/// error — the single-guid endpoints have no documented `BadGuids` response,
/// unlike the bulk endpoint's regex-validated query parameter.
fn guid_or_not_found(raw: &str) -> Result<ProcessGuid, ListenerError> {
    raw.parse::<ProcessGuid>().map_err(|_| ListenerError::NotFound)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tokio::sync::Semaphore;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use lrp_bbs_client::BbsClient;
    use lrp_metrics_client::MetricsClient;

    use super::*;

    async fn state_against(server: &MockServer, admission_capacity: usize) -> ListenerState {
        ListenerState {
            bbs: Arc::new(BbsClient::new(server.uri(), false)),
            metrics: Arc::new(MetricsClient::new(server.uri(), false)),
            admission: Arc::new(Semaphore::new(admission_capacity)),
            bulk_workers: 4,
            default_container_port: 8080,
            process_metrics: None,
        }
    }

    #[tokio::test]
    async fn lrp_status_synthesizes_missing_indices() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/desired_lrps/p1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "process_guid": "p1", "instances": 3, "log_stream_guid": "log-1",
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/actual_lrps"))
            .respond_with(ResponseTemplate::new(200).set_body_json(vec![serde_json::json!({
                "process_guid": "p1", "instance_guid": "i1", "cell_id": "c1", "index": 1,
                "domain": "cc-app", "state": "Running", "net_info": {"address": "", "ports": []},
                "since": 1_700_000_000_000_000_000i64, "crash_count": 0, "crash_reason": null,
                "placement_error": null, "presence": "Ordinary", "routable": null,
            })]))
            .mount(&server)
            .await;

        let app = router(state_against(&server, 10).await);
        let response = app
            .oneshot(Request::builder().uri("/v1/actual_lrps/p1").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = http_body_util::BodyExt::collect(response.into_body()).await.unwrap().to_bytes();
        let views: Vec<lrp_types::LRPInstanceView> = serde_json::from_slice(&body).unwrap();
        assert_eq!(views.len(), 3);
    }

    #[tokio::test]
    async fn lrp_stats_requires_authorization_header() {
        let server = MockServer::start().await;
        let app = router(state_against(&server, 10).await);
        let response = app
            .oneshot(Request::builder().uri("/v1/actual_lrps/p1/stats").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn lrp_stats_404s_when_desired_spec_is_absent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/desired_lrps/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let app = router(state_against(&server, 10).await);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/v1/actual_lrps/missing/stats")
                    .header("Authorization", "bearer x")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn lrp_stats_degrades_to_null_stats_on_metrics_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/desired_lrps/p1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "process_guid": "p1", "instances": 1, "log_stream_guid": "log-1",
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/actual_lrps"))
            .respond_with(ResponseTemplate::new(200).set_body_json(vec![serde_json::json!({
                "process_guid": "p1", "instance_guid": "i1", "cell_id": "c1", "index": 0,
                "domain": "cc-app", "state": "Running", "net_info": {"address": "", "ports": []},
                "since": 1, "crash_count": 0, "crash_reason": null,
                "placement_error": null, "presence": "Ordinary", "routable": null,
            })]))
            .mount(&server)
            .await;
        // No mock for /apps/log-1/containermetrics: the metrics client gets a 404.

        let app = router(state_against(&server, 10).await);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/v1/actual_lrps/p1/stats")
                    .header("Authorization", "bearer x")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = http_body_util::BodyExt::collect(response.into_body()).await.unwrap().to_bytes();
        let views: Vec<lrp_types::LRPInstanceView> = serde_json::from_slice(&body).unwrap();
        assert!(views[0].stats.is_none());
    }

    #[tokio::test]
    async fn bulk_status_rejects_malformed_guids() {
        let server = MockServer::start().await;
        let app = router(state_against(&server, 10).await);
        let response = app
            .oneshot(Request::builder().uri("/v1/bulk_actual_lrp_status?guids=").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn admission_cap_returns_503_when_saturated() {
        let server = MockServer::start().await;
        let state = state_against(&server, 1).await;
        let _permit = state.admission.acquire().await.unwrap();
        let app = router(state);
        let response = app
            .oneshot(Request::builder().uri("/v1/bulk_actual_lrp_status?guids=p1").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
