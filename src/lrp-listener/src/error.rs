//! Maps the handler-level failure kinds from §7's error-handling design
//! onto HTTP status codes via axum's `IntoResponse`, the idiomatic-axum
//! equivalent of the original Go handlers' ad hoc `w.WriteHeader(...)` calls.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    #[error("missing Authorization header")]
    MissingAuth,
    #[error("malformed guids parameter")]
    BadGuids,
    #[error("no desired spec for process guid")]
    NotFound,
    #[error("upstream failure: {0}")]
    Upstream(#[source] anyhow::Error),
}

impl IntoResponse for ListenerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ListenerError::MissingAuth => StatusCode::UNAUTHORIZED,
            ListenerError::BadGuids => StatusCode::BAD_REQUEST,
            ListenerError::NotFound => StatusCode::NOT_FOUND,
            ListenerError::Upstream(error) => {
                tracing::error!(%error, "upstream failure serving listener request");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        status.into_response()
    }
}
