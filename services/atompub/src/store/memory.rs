//! In-memory event store for tests and local runs.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use esatom_feed::EventRecord;
use tokio::sync::RwLock;

use super::{EventStoreGateway, PageLookup, StoreError};

#[derive(Default)]
struct MemoryState {
    recent: Vec<EventRecord>,
    /// Archive pages, oldest first.
    pages: Vec<(String, Vec<EventRecord>)>,
}

impl MemoryState {
    fn page_index(&self, page_id: &str) -> Option<usize> {
        self.pages.iter().position(|(id, _)| id == page_id)
    }
}

/// Event store held in process memory.
///
/// Pages are linked in the order they were added. Every read is counted so
/// tests can assert that a request never reached the store.
#[derive(Default)]
pub struct MemoryEventStore {
    state: RwLock<MemoryState>,
    reads: AtomicUsize,
    failing: AtomicBool,
}

impl MemoryEventStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an unassigned event.
    pub async fn append_recent(&self, event: EventRecord) {
        self.state.write().await.recent.push(event);
    }

    /// Freeze a new archive page after the current newest page.
    pub async fn add_page(&self, page_id: impl Into<String>, events: Vec<EventRecord>) {
        self.state.write().await.pages.push((page_id.into(), events));
    }

    /// Make every read fail with `StoreError::Unavailable`.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of reads performed so far.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn begin_read(&self) -> Result<(), StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store set to fail".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl EventStoreGateway for MemoryEventStore {
    async fn fetch_recent_events(&self) -> Result<Vec<EventRecord>, StoreError> {
        self.begin_read()?;
        Ok(self.state.read().await.recent.clone())
    }

    async fn fetch_last_page_id(&self) -> Result<Option<String>, StoreError> {
        self.begin_read()?;
        Ok(self.state.read().await.pages.last().map(|(id, _)| id.clone()))
    }

    async fn fetch_page_events(&self, page_id: &str) -> Result<PageLookup, StoreError> {
        self.begin_read()?;
        let state = self.state.read().await;
        let events = state
            .page_index(page_id)
            .map(|index| state.pages[index].1.clone())
            .unwrap_or_default();
        Ok(PageLookup::from_rows(events))
    }

    async fn fetch_previous_page_id(&self, page_id: &str) -> Result<Option<String>, StoreError> {
        self.begin_read()?;
        let state = self.state.read().await;
        Ok(state
            .page_index(page_id)
            .and_then(|index| index.checked_sub(1))
            .map(|index| state.pages[index].0.clone()))
    }

    async fn fetch_next_page_id(&self, page_id: &str) -> Result<Option<String>, StoreError> {
        self.begin_read()?;
        let state = self.state.read().await;
        Ok(state
            .page_index(page_id)
            .and_then(|index| state.pages.get(index + 1))
            .map(|(id, _)| id.clone()))
    }

    async fn fetch_event(
        &self,
        aggregate_id: &str,
        version: i64,
    ) -> Result<EventRecord, StoreError> {
        self.begin_read()?;
        let state = self.state.read().await;
        state
            .recent
            .iter()
            .chain(state.pages.iter().flat_map(|(_, events)| events.iter()))
            .find(|event| event.aggregate_id == aggregate_id && event.version == version)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                aggregate_id: aggregate_id.to_string(),
                version,
            })
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store set to fail".into()));
        }
        Ok(())
    }
}
