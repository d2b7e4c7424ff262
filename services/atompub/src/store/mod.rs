//! Read interface to the event store.
//!
//! The event store owns page assignment: it decides when the recent bucket
//! fills and freezes it into an archive page. This service only reads:
//! - Unassigned (recent) events and the newest page id
//! - The events of a named page and that page's neighbours
//! - Single events by aggregate id and version
//!
//! Two implementations are provided: [`PgEventStore`] over Postgres and
//! [`MemoryEventStore`] for tests and local runs.

mod error;
mod memory;
mod postgres;

pub use error::StoreError;
pub use memory::MemoryEventStore;
pub use postgres::{DbConfig, PgEventStore};

use async_trait::async_trait;
use esatom_feed::EventRecord;

/// Result of looking up an archive page.
///
/// An unknown page is an explicit outcome, distinct from a storage error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageLookup {
    /// The page exists; events are in store order (never empty).
    Found(Vec<EventRecord>),

    /// No events are assigned to this page id, so the page does not exist.
    Missing,
}

impl PageLookup {
    /// Classify rows returned for a page: zero rows means the page is unknown.
    pub fn from_rows(events: Vec<EventRecord>) -> Self {
        if events.is_empty() {
            PageLookup::Missing
        } else {
            PageLookup::Found(events)
        }
    }
}

/// Read operations the feed needs from the event store.
///
/// Implementations are shared by all concurrent requests.
#[async_trait]
pub trait EventStoreGateway: Send + Sync {
    /// Events not yet assigned to a page, oldest first.
    async fn fetch_recent_events(&self) -> Result<Vec<EventRecord>, StoreError>;

    /// Id of the newest archive page, if any page has been assigned.
    async fn fetch_last_page_id(&self) -> Result<Option<String>, StoreError>;

    /// Events assigned to `page_id`.
    async fn fetch_page_events(&self, page_id: &str) -> Result<PageLookup, StoreError>;

    /// The page immediately older than `page_id`.
    async fn fetch_previous_page_id(&self, page_id: &str) -> Result<Option<String>, StoreError>;

    /// The page immediately newer than `page_id`; `None` means recent is next.
    async fn fetch_next_page_id(&self, page_id: &str) -> Result<Option<String>, StoreError>;

    /// A single event. Returns `StoreError::NotFound` if it does not exist.
    async fn fetch_event(&self, aggregate_id: &str, version: i64)
        -> Result<EventRecord, StoreError>;

    /// Check the store is reachable.
    async fn health_check(&self) -> Result<(), StoreError>;
}
