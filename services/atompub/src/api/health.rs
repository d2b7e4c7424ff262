//! Health check endpoints.
//!
//! `/ping` is a liveness probe. `/health` is a readiness probe that checks
//! the event store and, when output encryption is on, the key service.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use tracing::warn;

use crate::state::AppState;

const SERVICE_NAME: &str = "atompub";

/// Readiness response.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct HealthResponse {
    /// Service status: "ok" or "degraded".
    pub status: String,

    /// Service name.
    pub service: String,

    /// Service version.
    pub version: String,

    /// Current timestamp (ISO 8601).
    pub timestamp: String,

    pub components: ComponentHealth,
}

/// Component health details.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct ComponentHealth {
    /// Event store reachability.
    pub event_store: ComponentStatus,

    /// Key service reachability, or "disabled" without encryption.
    pub key_service: ComponentStatus,
}

/// Individual component status.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct ComponentStatus {
    /// Status: "ok", "disabled", or "unavailable".
    pub status: String,

    /// Optional message with details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ComponentStatus {
    fn from_result<E: std::fmt::Display>(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => Self {
                status: "ok".to_string(),
                message: None,
            },
            Err(e) => Self {
                status: "unavailable".to_string(),
                message: Some(e.to_string()),
            },
        }
    }

    fn disabled() -> Self {
        Self {
            status: "disabled".to_string(),
            message: None,
        }
    }

    fn is_healthy(&self) -> bool {
        self.status != "unavailable"
    }
}

/// Create health check routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ping", get(ping))
        .route("/health", get(health))
}

/// Liveness: 200 with an empty body whenever the server is up.
async fn ping() -> StatusCode {
    StatusCode::OK
}

/// Readiness: 200 when the event store and key service are reachable,
/// 500 otherwise.
async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let event_store = ComponentStatus::from_result(state.store().health_check().await);

    let key_service = if state.cipher().is_enabled() {
        ComponentStatus::from_result(state.cipher().check().await)
    } else {
        ComponentStatus::disabled()
    };

    let all_ok = event_store.is_healthy() && key_service.is_healthy();
    if !all_ok {
        warn!(
            event_store = %event_store.status,
            key_service = %key_service.status,
            "Readiness check failed"
        );
    }

    let response = HealthResponse {
        status: if all_ok { "ok" } else { "degraded" }.to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
        components: ComponentHealth {
            event_store,
            key_service,
        },
    };

    if all_ok {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_status_from_result() {
        let ok = ComponentStatus::from_result::<String>(Ok(()));
        assert_eq!(ok.status, "ok");
        assert!(ok.is_healthy());

        let down = ComponentStatus::from_result(Err("connection refused"));
        assert_eq!(down.status, "unavailable");
        assert_eq!(down.message.as_deref(), Some("connection refused"));
        assert!(!down.is_healthy());

        assert!(ComponentStatus::disabled().is_healthy());
    }

    #[test]
    fn test_health_response_round_trip() {
        let response = HealthResponse {
            status: "ok".to_string(),
            service: SERVICE_NAME.to_string(),
            version: "0.1.0".to_string(),
            timestamp: "2026-01-01T00:00:00Z".to_string(),
            components: ComponentHealth {
                event_store: ComponentStatus::from_result::<String>(Ok(())),
                key_service: ComponentStatus::disabled(),
            },
        };

        let json = serde_json::to_string(&response).unwrap();
        let parsed: HealthResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.components.key_service.status, "disabled");
        assert!(!json.contains("message"));
    }
}
