//! Per-operation completion logging.

use std::time::Instant;

use axum::response::{IntoResponse, Response};
use tracing::{error, info, warn};

use super::error::ApiError;

/// Records how long a handler took and how it ended.
pub(crate) struct OpTimer {
    op: &'static str,
    started: Instant,
}

impl OpTimer {
    pub(crate) fn start(op: &'static str) -> Self {
        Self {
            op,
            started: Instant::now(),
        }
    }

    /// Log the outcome with the elapsed time, then turn it into a response.
    pub(crate) fn finish(self, result: Result<Response, ApiError>) -> Response {
        let elapsed_ms = u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let op = self.op;

        match result {
            Ok(response) => {
                info!(op, elapsed_ms, status = response.status().as_u16(), "request completed");
                response
            }
            Err(err) => {
                let status = err.status.as_u16();
                if err.status.is_server_error() {
                    error!(op, elapsed_ms, status, error = %err.detail, "request failed");
                } else {
                    warn!(op, elapsed_ms, status, error = %err.detail, "request rejected");
                }
                err.into_response()
            }
        }
    }
}
