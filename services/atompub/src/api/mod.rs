//! HTTP API handlers and routing.

pub mod error;
mod events;
mod health;
mod notifications;
mod timing;

use axum::{
    body::Body,
    http::{
        header::{CACHE_CONTROL, CONTENT_TYPE, ETAG},
        HeaderValue, StatusCode,
    },
    response::Response,
    Router,
};
use esatom_feed::CachePolicy;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use error::ApiError;

pub use health::{ComponentHealth, ComponentStatus, HealthResponse};

/// Content type of feed documents.
pub const ATOM_CONTENT_TYPE: &str = "application/atom+xml";

/// Content type of single-event documents.
pub const EVENT_CONTENT_TYPE: &str = "application/xml";

/// Create the main API router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Probes
        .merge(health::routes())
        // Feed and event resources
        .merge(notifications::routes())
        .merge(events::routes())
        // Middleware
        .layer(TraceLayer::new_for_http())
        // Application state
        .with_state(state)
}

/// A 200 response carrying a rendered (possibly encrypted) document.
///
/// The content type is that of the plain document even when the body is an
/// encrypted envelope.
fn document_response(
    content_type: &'static str,
    cache: &CachePolicy,
    body: Vec<u8>,
) -> Result<Response, ApiError> {
    let cache_control = HeaderValue::from_str(&cache.cache_control())
        .map_err(|e| ApiError::internal(format!("invalid cache-control value: {e}")))?;

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, HeaderValue::from_static(content_type))
        .header(CACHE_CONTROL, cache_control);

    if let Some(etag) = cache.etag() {
        let etag = HeaderValue::from_str(etag)
            .map_err(|e| ApiError::internal(format!("invalid etag {etag:?}: {e}")))?;
        builder = builder.header(ETAG, etag);
    }

    builder
        .body(Body::from(body))
        .map_err(|e| ApiError::internal(format!("failed to build response: {e}")))
}
