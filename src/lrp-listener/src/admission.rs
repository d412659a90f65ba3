//! Global admission control: a fixed-capacity semaphore gates the number
//! of concurrently executing handler bodies at `M`; requests that arrive
//! once the cap is saturated receive 503 immediately rather than queueing.
//!
//! Grounded in the `Arc<Semaphore>`-gated admission pattern the pack's
//! `fechatter_server` `ServiceProvider` uses for connection admission,
//! adapted from a connection pool to an axum middleware layer.

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::state::ListenerState;

/// Runs before every handler. Acquires a permit for the duration of the
/// handler call; the permit (and thus the in-flight count) is released the
/// instant this function returns, regardless of how the handler completed.
pub async fn enforce_admission(
    State(state): State<ListenerState>,
    request: Request,
    next: Next,
) -> Response {
    match state.admission.try_acquire() {
        Ok(_permit) => {
            let response = next.run(request).await;
            if let Some(metrics) = &state.process_metrics {
                metrics.requests_total.with_label_values(&["admitted", response.status().as_str()]).inc();
            }
            response
        }
        Err(_) => {
            if let Some(metrics) = &state.process_metrics {
                metrics.requests_total.with_label_values(&["rejected", "503"]).inc();
            }
            StatusCode::SERVICE_UNAVAILABLE.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::Request as HttpRequest;
    use axum::middleware;
    use axum::routing::get;
    use axum::Router;
    use tokio::sync::Semaphore;
    use tower::ServiceExt;

    use lrp_bbs_client::BbsClient;
    use lrp_metrics_client::MetricsClient;

    use super::*;

    fn test_state(capacity: usize) -> ListenerState {
        ListenerState {
            bbs: Arc::new(BbsClient::new("http://127.0.0.1:1", false)),
            metrics: Arc::new(MetricsClient::new("http://127.0.0.1:1", false)),
            admission: Arc::new(Semaphore::new(capacity)),
            bulk_workers: 1,
            default_container_port: 8080,
            process_metrics: None,
        }
    }

    fn app(state: ListenerState) -> Router {
        Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(middleware::from_fn_with_state(state.clone(), enforce_admission))
            .with_state(state)
    }

    #[tokio::test]
    async fn rejects_once_capacity_is_exhausted() {
        let state = test_state(1);
        let _permit = state.admission.acquire().await.unwrap();
        let response = app(state).oneshot(HttpRequest::builder().uri("/").body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn admits_under_capacity() {
        let state = test_state(1);
        let response = app(state).oneshot(HttpRequest::builder().uri("/").body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
