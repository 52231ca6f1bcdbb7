use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use netmap_http_util::{error_response, error_response_for, Envelope};
use netmap_store::Store;
use netmap_types::{ExpArgs, Exception, RecArgs, SockTable};

use crate::state::AppState;

static CLUSTER_ID_HEADER: HeaderName = HeaderName::from_static("cluster-id");

/// `true` if this request already carries a peer's replication marker — it
/// originated from another node's fan-out and must not itself fan out
/// again.
fn is_replicated(headers: &HeaderMap) -> bool {
    headers.contains_key(&CLUSTER_ID_HEADER)
}

fn validate_all(records: &[SockTable]) -> (Vec<SockTable>, Vec<String>) {
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();
    for record in records {
        match record.validate() {
            Ok(()) => accepted.push(record.clone()),
            Err(_) => rejected.push(record.id.clone()),
        }
    }
    (accepted, rejected)
}

/// Builds the 400 response for a batch with one or more rejected records: a
/// warning payload listing the IDs that WERE accepted and saved, so the
/// caller can tell which of its records actually landed.
fn partial_rejection_response(accepted: &[SockTable]) -> Response {
    let accepted_ids: Vec<String> = accepted.iter().map(|r| r.id.clone()).collect();
    Envelope::success_with_warnings(accepted_ids, vec!["one or more records were rejected".to_string()])
        .into_response_with(StatusCode::BAD_REQUEST)
}

pub async fn handle_netstat(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(records): Json<Vec<SockTable>>,
) -> Response {
    if is_replicated(&headers) {
        return StatusCode::OK.into_response();
    }
    let (accepted, rejected) = validate_all(&records);
    if let Err(err) = state.store.save_netstat(accepted.clone()).await {
        return error_response_for(err.into());
    }
    state
        .peers
        .fan_out(|mut client| {
            let batch = accepted.clone();
            async move { client.set_netstat(batch).await }
        })
        .await;
    if !rejected.is_empty() {
        return partial_rejection_response(&accepted);
    }
    StatusCode::NO_CONTENT.into_response()
}

pub async fn handle_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(records): Json<Vec<SockTable>>,
) -> Response {
    if is_replicated(&headers) {
        return StatusCode::OK.into_response();
    }
    if let Err(err) = state.store.save_status(records.clone()).await {
        return error_response_for(err.into());
    }
    state
        .peers
        .fan_out(|mut client| {
            let batch = records.clone();
            async move { client.set_status(batch).await }
        })
        .await;
    StatusCode::NO_CONTENT.into_response()
}

pub async fn handle_tracert(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(records): Json<Vec<SockTable>>,
) -> Response {
    if is_replicated(&headers) {
        return StatusCode::OK.into_response();
    }
    if let Err(err) = state.store.save_tracert(records.clone()).await {
        return error_response_for(err.into());
    }
    state
        .peers
        .fan_out(|mut client| {
            let batch = records.clone();
            async move { client.set_tracert(batch).await }
        })
        .await;
    StatusCode::NO_CONTENT.into_response()
}

pub async fn handle_get_records(
    State(state): State<Arc<AppState>>,
    Query(args): Query<RecArgs>,
) -> Response {
    let local = match state.store.load_records(args.clone()).await {
        Ok(rows) => rows,
        Err(err) => return error_response_for(err.into()),
    };
    let peer_results = state
        .peers
        .fan_out(|mut client| {
            let args = args.clone();
            async move { client.get_records(args).await }
        })
        .await;
    let mut sources = vec![local];
    for result in peer_results {
        match result {
            Ok(rows) => sources.push(rows),
            Err(err) => tracing::warn!(error = %err, "peer GetRecords failed, omitting from merge"),
        }
    }
    let mut merged = netmap_cluster::merge_records(sources);
    if let Some(min_timestamp) = args.timestamp {
        merged.retain(|r| r.timestamp >= min_timestamp);
    }
    Envelope::success(merged).into_response_with(StatusCode::OK)
}

pub async fn handle_post_records(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(records): Json<Vec<SockTable>>,
) -> Response {
    if is_replicated(&headers) {
        return StatusCode::OK.into_response();
    }
    let (accepted, rejected) = validate_all(&records);
    if let Err(err) = state.store.save_records(accepted.clone()).await {
        return error_response_for(err.into());
    }
    state
        .peers
        .fan_out(|mut client| {
            let batch = accepted.clone();
            async move { client.set_records(batch).await }
        })
        .await;
    if !rejected.is_empty() {
        return partial_rejection_response(&accepted);
    }
    StatusCode::NO_CONTENT.into_response()
}

pub async fn handle_delete_records(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(ids): Json<Vec<String>>,
) -> Response {
    if is_replicated(&headers) {
        return StatusCode::OK.into_response();
    }
    if let Err(err) = state.store.del_records(ids.clone()).await {
        return error_response_for(err.into());
    }
    let results = state
        .peers
        .fan_out(|mut client| {
            let batch = ids.clone();
            async move { client.del_records(batch).await }
        })
        .await;
    if results.iter().any(Result::is_err) {
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "one or more peers failed to delete");
    }
    StatusCode::OK.into_response()
}

pub async fn handle_get_exceptions(
    State(state): State<Arc<AppState>>,
    Query(args): Query<ExpArgs>,
) -> Response {
    let local = match state.store.load_exceptions(args.clone()).await {
        Ok(rows) => rows,
        Err(err) => return error_response_for(err.into()),
    };
    let peer_results = state
        .peers
        .fan_out(|mut client| {
            let args = args.clone();
            async move { client.get_exceptions(args).await }
        })
        .await;
    let mut sources = vec![local];
    for result in peer_results {
        match result {
            Ok(rows) => sources.push(rows),
            Err(err) => tracing::warn!(error = %err, "peer GetExceptions failed, omitting from merge"),
        }
    }
    let merged = netmap_cluster::merge_exceptions(sources);
    Envelope::success(merged).into_response_with(StatusCode::OK)
}

pub async fn handle_post_exceptions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(exceptions): Json<Vec<Exception>>,
) -> Response {
    if is_replicated(&headers) {
        return StatusCode::OK.into_response();
    }
    if let Err(err) = state.store.save_exceptions(exceptions.clone()).await {
        return error_response_for(err.into());
    }
    state
        .peers
        .fan_out(|mut client| {
            let batch = exceptions.clone();
            async move { client.set_exceptions(batch).await }
        })
        .await;
    StatusCode::NO_CONTENT.into_response()
}

pub async fn handle_delete_exceptions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(ids): Json<Vec<String>>,
) -> Response {
    if is_replicated(&headers) {
        return StatusCode::OK.into_response();
    }
    if let Err(err) = state.store.del_exceptions(ids.clone()).await {
        return error_response_for(err.into());
    }
    let results = state
        .peers
        .fan_out(|mut client| {
            let batch = ids.clone();
            async move { client.del_exceptions(batch).await }
        })
        .await;
    if results.iter().any(Result::is_err) {
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "one or more peers failed to delete");
    }
    StatusCode::OK.into_response()
}

pub async fn handle_webhook(State(state): State<Arc<AppState>>, body: bytes::Bytes) -> Response {
    match &state.notifiers {
        Some(notifiers) => {
            crate::webhook::forward(notifiers, body);
            StatusCode::NO_CONTENT.into_response()
        }
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

