//! Application state shared across request handlers.

use std::sync::Arc;

use esatom_envelope::OutputCipher;
use esatom_feed::FeedAssembler;

use crate::store::EventStoreGateway;

/// Shared application state.
///
/// This is passed to all request handlers via Axum's state extractor.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<dyn EventStoreGateway>,
    assembler: FeedAssembler,
    cipher: Arc<dyn OutputCipher>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        store: Arc<dyn EventStoreGateway>,
        assembler: FeedAssembler,
        cipher: Arc<dyn OutputCipher>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                store,
                assembler,
                cipher,
            }),
        }
    }

    /// Get a reference to the event store.
    pub fn store(&self) -> &dyn EventStoreGateway {
        self.inner.store.as_ref()
    }

    pub fn assembler(&self) -> &FeedAssembler {
        &self.inner.assembler
    }

    /// Get a reference to the output cipher.
    pub fn cipher(&self) -> &dyn OutputCipher {
        self.inner.cipher.as_ref()
    }
}
