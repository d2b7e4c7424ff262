use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use esatom_envelope::EnvelopeError;
use esatom_feed::FeedError;

use crate::store::StoreError;

/// A failed request.
///
/// `message` is the only thing the client sees; `detail` carries the full
/// error for the log line.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: &'static str,
    pub detail: String,
}

impl ApiError {
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: "bad request",
            detail: detail.into(),
        }
    }

    /// 404 with an empty body.
    pub fn not_found(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: "",
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "internal server error",
            detail: detail.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

impl From<FeedError> for ApiError {
    fn from(err: FeedError) -> Self {
        match err {
            FeedError::NotFound(_) => ApiError::not_found(err.to_string()),
            FeedError::UnsupportedPayload { .. } | FeedError::Serialization(_) => {
                ApiError::internal(err.to_string())
            }
        }
    }
}

impl From<EnvelopeError> for ApiError {
    fn from(err: EnvelopeError) -> Self {
        ApiError::internal(err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => ApiError::not_found(err.to_string()),
            StoreError::Connect(_) | StoreError::Query(_) | StoreError::Unavailable(_) => {
                ApiError::internal(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_not_found_maps_to_404() {
        let err: ApiError = StoreError::NotFound {
            aggregate_id: "agg".into(),
            version: 2,
        }
        .into();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, "");
        assert_eq!(err.detail, "event not found: agg:2");
    }

    #[test]
    fn test_unsupported_payload_maps_to_500() {
        let err: ApiError = FeedError::UnsupportedPayload {
            aggregate_id: "agg".into(),
            version: 1,
            kind: "text".into(),
        }
        .into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_key_service_error_is_terse() {
        let err: ApiError = EnvelopeError::KeyService("connection refused to 10.0.0.1".into()).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message.contains("10.0.0.1"));
        assert!(err.detail.contains("10.0.0.1"));
    }
}
