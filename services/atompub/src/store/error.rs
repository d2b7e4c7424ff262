//! Event store error types.

use thiserror::Error;

/// Event store read errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to connect to the database.
    #[error("failed to connect to event store: {0}")]
    Connect(#[source] sqlx::Error),

    /// Failed to execute a query.
    #[error("query failed: {0}")]
    Query(#[source] sqlx::Error),

    /// The requested event does not exist.
    #[error("event not found: {aggregate_id}:{version}")]
    NotFound { aggregate_id: String, version: i64 },

    /// The store is unavailable for another reason.
    #[error("event store unavailable: {0}")]
    Unavailable(String),
}
