//! Single event endpoint.

use axum::{
    extract::{Path, State},
    response::Response,
    routing::get,
    Router,
};
use esatom_feed::CachePolicy;

use super::{document_response, error::ApiError, timing::OpTimer, EVENT_CONTENT_TYPE};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/events/{aggregate_id}/{version}", get(retrieve_event))
}

/// GET /events/{aggregate_id}/{version}
async fn retrieve_event(
    State(state): State<AppState>,
    Path((aggregate_id, version)): Path<(String, String)>,
) -> Response {
    let timer = OpTimer::start("retrieve-event");
    timer.finish(render_event(&state, &aggregate_id, &version).await)
}

async fn render_event(
    state: &AppState,
    aggregate_id: &str,
    version: &str,
) -> Result<Response, ApiError> {
    let version = parse_version(version)?;

    let event = state.store().fetch_event(aggregate_id, version).await?;
    let document = state.assembler().build_event_document(&event)?;
    let body = state.cipher().encrypt(document.to_xml()?.into_bytes()).await?;

    document_response(
        EVENT_CONTENT_TYPE,
        &CachePolicy::for_event(aggregate_id, version),
        body,
    )
}

/// Versions are non-negative integers that fit the store's signed column.
fn parse_version(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<u64>()
        .ok()
        .and_then(|v| i64::try_from(v).ok())
        .ok_or_else(|| ApiError::bad_request(format!("invalid event version {raw:?}")))
}
