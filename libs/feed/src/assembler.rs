//! Feed assembly: event records plus page linkage in, Atom documents out.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, SecondsFormat, Utc};

use crate::{
    CachePolicy, Content, Entry, EventDocument, EventRecord, FeedDocument, FeedError, FeedLinks,
    Link, LinkRelation, PageLinkage, ATOM_NAMESPACE, EVENT_NAMESPACE,
};

/// Identifier of the mutable feed of unassigned events.
pub const RECENT_FEED_ID: &str = "recent";

/// Title carried by every feed document.
pub const FEED_TITLE: &str = "Event store feed";

const ENTRY_TITLE: &str = "event";

/// An assembled archive page together with its cache policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveFeed {
    pub document: FeedDocument,
    pub cache: CachePolicy,
}

/// Assembles feed documents. Holds no per-request state.
#[derive(Debug, Clone)]
pub struct FeedAssembler {
    links: FeedLinks,
}

impl FeedAssembler {
    pub fn new(links: FeedLinks) -> Self {
        Self { links }
    }

    pub fn links(&self) -> &FeedLinks {
        &self.links
    }

    /// Build the `recent` feed, stamped with the current time.
    pub fn build_recent_feed(
        &self,
        events: &[EventRecord],
        last_page_id: Option<&str>,
    ) -> Result<FeedDocument, FeedError> {
        self.build_recent_feed_at(events, last_page_id, Utc::now())
    }

    /// Build the `recent` feed with an explicit `updated` time.
    pub fn build_recent_feed_at(
        &self,
        events: &[EventRecord],
        last_page_id: Option<&str>,
        updated: DateTime<Utc>,
    ) -> Result<FeedDocument, FeedError> {
        Ok(FeedDocument {
            xmlns: ATOM_NAMESPACE.to_string(),
            title: FEED_TITLE.to_string(),
            id: RECENT_FEED_ID.to_string(),
            links: self.links.recent_links(last_page_id),
            updated: Some(updated.to_rfc3339_opts(SecondsFormat::Secs, true)),
            entries: self.entries(events)?,
        })
    }

    /// Build an archive page.
    ///
    /// A page with no events does not exist: this returns
    /// `FeedError::NotFound` instead of an empty document.
    pub fn build_archive_feed(
        &self,
        page_id: &str,
        events: &[EventRecord],
        linkage: &PageLinkage,
    ) -> Result<ArchiveFeed, FeedError> {
        if events.is_empty() {
            return Err(FeedError::NotFound(page_id.to_string()));
        }

        let archive = self.links.archive_links(page_id, linkage);
        let document = FeedDocument {
            xmlns: ATOM_NAMESPACE.to_string(),
            title: FEED_TITLE.to_string(),
            id: page_id.to_string(),
            links: archive.links,
            updated: None,
            entries: self.entries(events)?,
        };

        Ok(ArchiveFeed {
            document,
            cache: archive.cache,
        })
    }

    /// Build the document served for a single event.
    pub fn build_event_document(&self, event: &EventRecord) -> Result<EventDocument, FeedError> {
        let payload = event.payload_bytes()?;
        Ok(EventDocument {
            xmlns: EVENT_NAMESPACE.to_string(),
            aggregate_id: event.aggregate_id.clone(),
            version: event.version,
            published: published(event),
            typecode: event.type_code.clone(),
            content: STANDARD.encode(payload),
        })
    }

    /// Entries in the order the store returned the events.
    fn entries(&self, events: &[EventRecord]) -> Result<Vec<Entry>, FeedError> {
        events.iter().map(|event| self.entry(event)).collect()
    }

    fn entry(&self, event: &EventRecord) -> Result<Entry, FeedError> {
        let payload = event.payload_bytes()?;
        Ok(Entry {
            title: ENTRY_TITLE.to_string(),
            id: format!("urn:esid:{}:{}", event.aggregate_id, event.version),
            links: vec![Link::new(
                LinkRelation::SelfLink,
                self.links.event(&event.aggregate_id, event.version),
            )],
            published: published(event),
            content: Content {
                content_type: event.type_code.clone(),
                body: STANDARD.encode(payload),
            },
        })
    }
}

fn published(event: &EventRecord) -> String {
    event.occurred_at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::Payload;

    fn assembler() -> FeedAssembler {
        FeedAssembler::new(FeedLinks::new("http", "testhost:12345"))
    }

    fn event(aggregate_id: &str, version: i64, type_code: &str, payload: &[u8]) -> EventRecord {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap()
            + chrono::Duration::nanoseconds(123_456_789);
        EventRecord::new(aggregate_id, version, type_code, payload, ts)
    }

    #[test]
    fn test_recent_feed_single_event_no_pages() {
        let feed = assembler()
            .build_recent_feed(&[event("agg1", 1, "foo", b"ok")], None)
            .unwrap();

        assert_eq!(feed.id, "recent");
        assert_eq!(feed.title, FEED_TITLE);
        assert!(feed.updated.is_some());
        assert_eq!(feed.link(LinkRelation::PrevArchive), None);
        assert_eq!(
            feed.link(LinkRelation::SelfLink),
            Some("http://testhost:12345/notifications/recent")
        );

        assert_eq!(feed.entries.len(), 1);
        let entry = &feed.entries[0];
        assert_eq!(entry.title, "event");
        assert_eq!(entry.id, "urn:esid:agg1:1");
        assert_eq!(entry.content.content_type, "foo");
        assert_eq!(entry.content.body, "b2s=");
        assert_eq!(entry.published, "2024-03-01T12:30:00.123456789Z");
        assert_eq!(entry.links[0].href, "http://testhost:12345/events/agg1/1");
    }

    #[test]
    fn test_recent_feed_links_last_page() {
        let updated = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let feed = assembler()
            .build_recent_feed_at(&[], Some("feed-xxx"), updated)
            .unwrap();

        assert_eq!(feed.updated.as_deref(), Some("2024-03-01T00:00:00Z"));
        assert_eq!(
            feed.link(LinkRelation::PrevArchive),
            Some("http://testhost:12345/notifications/feed-xxx")
        );
        assert!(feed.entries.is_empty());
    }

    #[test]
    fn test_archive_feed_keeps_store_order() {
        let events = vec![
            event("agg2", 1, "bar", b"ok ok"),
            event("agg1", 1, "foo", b"ok"),
        ];
        let linkage = PageLinkage::new("feed-xxx", None, None);

        let archive = assembler()
            .build_archive_feed("feed-xxx", &events, &linkage)
            .unwrap();

        let ids: Vec<_> = archive.document.entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["urn:esid:agg2:1", "urn:esid:agg1:1"]);
        assert_eq!(archive.document.updated, None);
        assert_eq!(archive.cache.etag(), Some("feed-xxx"));
        assert_eq!(
            archive.document.link(LinkRelation::NextArchive),
            Some("http://testhost:12345/notifications/recent")
        );
    }

    #[test]
    fn test_archive_feed_without_events_is_not_found() {
        let linkage = PageLinkage::new("nope", None, None);
        let err = assembler()
            .build_archive_feed("nope", &[], &linkage)
            .unwrap_err();

        assert_eq!(err, FeedError::NotFound("nope".to_string()));
    }

    #[test]
    fn test_unsupported_payload_fails_feed() {
        let mut bad = event("agg1", 2, "foo", b"");
        bad.payload = Payload::Unsupported("jsonb".to_string());

        let err = assembler()
            .build_recent_feed(&[event("agg1", 1, "foo", b"ok"), bad], None)
            .unwrap_err();

        assert!(matches!(err, FeedError::UnsupportedPayload { version: 2, .. }));
    }

    #[test]
    fn test_event_document() {
        let doc = assembler()
            .build_event_document(&event("1234567", 1, "foo", b"yeah ok"))
            .unwrap();

        assert_eq!(doc.aggregate_id, "1234567");
        assert_eq!(doc.version, 1);
        assert_eq!(doc.typecode, "foo");
        assert_eq!(doc.content, "eWVhaCBvaw==");
        assert_eq!(doc.published, "2024-03-01T12:30:00.123456789Z");
    }
}
