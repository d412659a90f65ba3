//! The three read-only endpoints described in §4.F, composed from
//! `lrp-bbs-client`, `lrp-metrics-client`, and `lrp-projector`.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use lrp_bbs_client::BbsError;
use lrp_types::{LRPInstanceView, ProcessGuid};

use crate::error::ListenerError;
use crate::state::ListenerState;
use crate::{bulk, guid_or_not_found};

/// `GET /v1/actual_lrps/{guid}`.
pub async fn lrp_status(
    State(state): State<ListenerState>,
    Path(guid): Path<String>,
) -> Result<Json<Vec<LRPInstanceView>>, ListenerError> {
    let guid = guid_or_not_found(&guid)?;

    let target_instances = match state.bbs.desired_by_process_guid(&guid).await {
        Ok(spec) => spec.instances,
        Err(BbsError::NotFound(_)) => 0,
        Err(error) => return Err(ListenerError::Upstream(error.into())),
    };
    let actuals = state
        .bbs
        .actual_instances_by_process_guid(&guid)
        .await
        .map_err(|error| ListenerError::Upstream(error.into()))?;

    let views = lrp_projector::project_status(&guid, &actuals, target_instances, lrp_ore::now::system_time());
    Ok(Json(views))
}

/// `GET /v1/actual_lrps/{guid}/stats`.
pub async fn lrp_stats(
    State(state): State<ListenerState>,
    Path(guid): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Vec<LRPInstanceView>>, ListenerError> {
    if !headers.contains_key(axum::http::header::AUTHORIZATION) {
        return Err(ListenerError::MissingAuth);
    }
    let auth_token = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    let guid = guid_or_not_found(&guid)?;

    let desired = match state.bbs.desired_by_process_guid(&guid).await {
        Ok(spec) => spec,
        Err(BbsError::NotFound(_)) => return Err(ListenerError::NotFound),
        Err(error) => return Err(ListenerError::Upstream(error.into())),
    };
    let actuals = state
        .bbs
        .actual_instances_by_process_guid(&guid)
        .await
        .map_err(|error| ListenerError::Upstream(error.into()))?;

    // Best-effort: a metrics failure degrades to an empty sample set, never
    // to an error response (§4.B, confirmed by scenario S5).
    let metrics = state.metrics.container_metrics(&desired.log_stream_guid, auth_token).await;

    let views = lrp_projector::project_stats(
        &actuals,
        &metrics,
        state.default_container_port,
        lrp_ore::now::system_time(),
    );
    Ok(Json(views))
}

static GUIDS_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([A-Za-z0-9_-]+,)*[A-Za-z0-9_-]+$").unwrap());

#[derive(Debug, Deserialize)]
pub struct BulkQuery {
    #[serde(default)]
    guids: String,
}

/// `GET /v1/bulk_actual_lrp_status`.
pub async fn bulk_lrp_status(
    State(state): State<ListenerState>,
    Query(query): Query<BulkQuery>,
) -> Result<Json<HashMap<ProcessGuid, Vec<LRPInstanceView>>>, ListenerError> {
    if !GUIDS_PATTERN.is_match(&query.guids) {
        return Err(ListenerError::BadGuids);
    }
    let guids: Vec<ProcessGuid> = query
        .guids
        .split(',')
        .map(|guid| guid.parse::<ProcessGuid>())
        .collect::<Result<_, _>>()
        .map_err(|_| ListenerError::BadGuids)?;

    let bbs = state.bbs.clone();
    let bulk_workers = state.bulk_workers;
    let results = bulk::fan_out(guids, bulk_workers, move |guid| {
        let bbs = bbs.clone();
        async move {
            match bbs.actual_instances_by_process_guid(&guid).await {
                Ok(actuals) => {
                    let now = lrp_ore::now::system_time();
                    Some(actuals.iter().map(|actual| lrp_projector::project_instance(actual, now)).collect())
                }
                Err(error) => {
                    tracing::warn!(%guid, %error, "bulk status: failed fetching actual instances, excluding guid");
                    None
                }
            }
        }
    })
    .await;

    Ok(Json(results))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guids_pattern_matches_the_spec_regex() {
        assert!(GUIDS_PATTERN.is_match("p1"));
        assert!(GUIDS_PATTERN.is_match("p1,p2,p3"));
        assert!(!GUIDS_PATTERN.is_match(""));
        assert!(!GUIDS_PATTERN.is_match("p1,"));
        assert!(!GUIDS_PATTERN.is_match("p1, p2"));
        assert!(!GUIDS_PATTERN.is_match("has space"));
    }
}
