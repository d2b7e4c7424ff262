//! Feed endpoints: the mutable `recent` feed and frozen archive pages.

use axum::{
    extract::{Path, State},
    response::Response,
    routing::get,
    Router,
};
use esatom_feed::{CachePolicy, PageLinkage};
use tracing::debug;

use super::{document_response, error::ApiError, timing::OpTimer, ATOM_CONTENT_TYPE};
use crate::{state::AppState, store::PageLookup};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/notifications/recent", get(recent))
        .route("/notifications/", get(missing_page_id))
        .route("/notifications/{page_id}", get(archive))
}

/// GET /notifications/recent
async fn recent(State(state): State<AppState>) -> Response {
    let timer = OpTimer::start("notifications-recent");
    timer.finish(render_recent(&state).await)
}

/// GET /notifications/
async fn missing_page_id() -> Response {
    let timer = OpTimer::start("notifications-archive");
    timer.finish(Err(ApiError::bad_request("no page id in request")))
}

/// GET /notifications/{page_id}
async fn archive(State(state): State<AppState>, Path(page_id): Path<String>) -> Response {
    let timer = OpTimer::start("notifications-archive");
    timer.finish(render_archive(&state, &page_id).await)
}

async fn render_recent(state: &AppState) -> Result<Response, ApiError> {
    let store = state.store();
    let events = store.fetch_recent_events().await?;
    let last_page_id = store.fetch_last_page_id().await?;

    let feed = state
        .assembler()
        .build_recent_feed(&events, last_page_id.as_deref())?;
    let body = state.cipher().encrypt(feed.to_xml()?.into_bytes()).await?;

    document_response(ATOM_CONTENT_TYPE, &CachePolicy::NoStore, body)
}

async fn render_archive(state: &AppState, page_id: &str) -> Result<Response, ApiError> {
    if page_id.is_empty() {
        return Err(ApiError::bad_request("no page id in request"));
    }

    let store = state.store();
    let events = match store.fetch_page_events(page_id).await? {
        PageLookup::Found(events) => events,
        PageLookup::Missing => {
            return Err(ApiError::not_found(format!("no events for page {page_id}")));
        }
    };

    let previous = store.fetch_previous_page_id(page_id).await?;
    let next = store.fetch_next_page_id(page_id).await?;
    let linkage = PageLinkage::new(page_id, previous, next);
    debug!(
        page_id,
        previous = ?linkage.previous_page_id,
        next = ?linkage.next_page_id,
        "Resolved page linkage"
    );

    let archive = state
        .assembler()
        .build_archive_feed(page_id, &events, &linkage)?;
    let body = state
        .cipher()
        .encrypt(archive.document.to_xml()?.into_bytes())
        .await?;

    document_response(ATOM_CONTENT_TYPE, &archive.cache, body)
}
