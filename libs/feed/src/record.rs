//! Event records as handed over by the event store.

use chrono::{DateTime, Utc};

use crate::FeedError;

/// Stored representation of an event payload.
///
/// Only raw bytes can be published. Anything else the store hands back is
/// kept as `Unsupported` so the feed can refuse it instead of coercing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Raw payload bytes.
    Bytes(Vec<u8>),

    /// A payload of some other representation, named by `kind`.
    Unsupported(String),
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::Bytes(bytes)
    }
}

impl From<&[u8]> for Payload {
    fn from(bytes: &[u8]) -> Self {
        Payload::Bytes(bytes.to_vec())
    }
}

/// A single immutable event, identified by `(aggregate_id, version)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    /// The aggregate the event belongs to.
    pub aggregate_id: String,

    /// Version of the aggregate this event produced (starts at 1).
    pub version: i64,

    /// Event type code, published as the entry content type.
    pub type_code: String,

    /// Event payload.
    pub payload: Payload,

    /// When the event was stored.
    pub occurred_at: DateTime<Utc>,
}

impl EventRecord {
    /// Create a record with a byte payload.
    pub fn new(
        aggregate_id: impl Into<String>,
        version: i64,
        type_code: impl Into<String>,
        payload: impl Into<Payload>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            aggregate_id: aggregate_id.into(),
            version,
            type_code: type_code.into(),
            payload: payload.into(),
            occurred_at,
        }
    }

    /// The payload bytes, or `UnsupportedPayload` if the payload is not raw bytes.
    pub fn payload_bytes(&self) -> Result<&[u8], FeedError> {
        match &self.payload {
            Payload::Bytes(bytes) => Ok(bytes),
            Payload::Unsupported(kind) => Err(FeedError::UnsupportedPayload {
                aggregate_id: self.aggregate_id.clone(),
                version: self.version,
                kind: kind.clone(),
            }),
        }
    }

    /// ETag used for the single-event resource.
    pub fn etag(&self) -> String {
        format!("{}:{}", self.aggregate_id, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_bytes_rejects_unsupported() {
        let record = EventRecord::new(
            "agg1",
            3,
            "foo",
            Payload::Unsupported("text".to_string()),
            Utc::now(),
        );

        let err = record.payload_bytes().unwrap_err();
        assert_eq!(
            err,
            FeedError::UnsupportedPayload {
                aggregate_id: "agg1".to_string(),
                version: 3,
                kind: "text".to_string(),
            }
        );
    }

    #[test]
    fn test_etag_joins_identity() {
        let record = EventRecord::new("agg1", 7, "foo", b"ok".as_slice(), Utc::now());
        assert_eq!(record.etag(), "agg1:7");
        assert_eq!(record.payload_bytes().unwrap(), b"ok");
    }
}
