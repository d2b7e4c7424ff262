//! Error types for feed assembly.

use thiserror::Error;

/// Errors that can occur while assembling or rendering a feed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FeedError {
    /// The requested archive page has no events, so it does not exist.
    #[error("feed page not found: {0}")]
    NotFound(String),

    /// An event payload was not a raw byte sequence.
    #[error("unsupported payload for {aggregate_id}:{version}: {kind}")]
    UnsupportedPayload {
        aggregate_id: String,
        version: i64,
        kind: String,
    },

    /// The document could not be rendered to (or parsed from) XML.
    #[error("serialization error: {0}")]
    Serialization(String),
}
