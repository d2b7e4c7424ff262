//! # esatom-feed
//!
//! Builds the paged Atom notification feed over an append-only event log.
//!
//! ## Paging Model
//!
//! Events that have not yet been assigned to a page live in the mutable
//! `recent` bucket. Once the event store freezes a page it becomes an
//! immutable archive page, linked to its neighbours with `prev-archive` /
//! `next-archive` relations (RFC 5005). The newest archive page points
//! forward to `recent`.
//!
//! ## Caching
//!
//! - `recent` is never cached (`Cache-Control: no-store`)
//! - archive pages and single events are cached for 30 days, keyed by ETag
//!
//! Deciding when a page fills is the event store's job; this crate only
//! renders what the store hands it.

mod assembler;
mod document;
mod error;
mod links;
mod record;

pub use assembler::{ArchiveFeed, FeedAssembler, FEED_TITLE, RECENT_FEED_ID};
pub use document::{Content, Entry, EventDocument, FeedDocument, Link, ATOM_NAMESPACE, EVENT_NAMESPACE};
pub use error::FeedError;
pub use links::{ArchiveLinks, CachePolicy, FeedLinks, LinkRelation, PageLinkage};
pub use record::{EventRecord, Payload};
