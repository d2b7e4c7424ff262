//! Wire documents: the Atom feed and the single-event document.
//!
//! Field order matches the element order written on the wire.

use serde::{Deserialize, Serialize};

use crate::{FeedError, LinkRelation};

/// Atom namespace for the feed root element.
pub const ATOM_NAMESPACE: &str = "http://www.w3.org/2005/Atom";

/// Namespace for the single-event document root element.
pub const EVENT_NAMESPACE: &str = "urn:esatom:event";

fn atom_namespace() -> String {
    ATOM_NAMESPACE.to_string()
}

fn event_namespace() -> String {
    EVENT_NAMESPACE.to_string()
}

/// A link relation (`<link rel=".." href=".."/>`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    #[serde(rename = "@rel")]
    pub rel: String,

    #[serde(rename = "@href")]
    pub href: String,
}

impl Link {
    pub fn new(relation: LinkRelation, href: impl Into<String>) -> Self {
        Self {
            rel: relation.as_str().to_string(),
            href: href.into(),
        }
    }
}

/// Entry content: the event type code plus base64 payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    #[serde(rename = "@type")]
    pub content_type: String,

    #[serde(rename = "$text", default)]
    pub body: String,
}

/// One feed entry per event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub title: String,

    /// `urn:esid:{aggregate_id}:{version}`
    pub id: String,

    #[serde(rename = "link", default)]
    pub links: Vec<Link>,

    /// RFC 3339 timestamp with nanoseconds.
    pub published: String,

    pub content: Content,
}

/// An Atom feed document: either `recent` or a named archive page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "feed")]
pub struct FeedDocument {
    #[serde(rename = "@xmlns", default = "atom_namespace")]
    pub xmlns: String,

    pub title: String,

    pub id: String,

    #[serde(rename = "link", default)]
    pub links: Vec<Link>,

    /// Only set on the recent feed.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub updated: Option<String>,

    #[serde(rename = "entry", default)]
    pub entries: Vec<Entry>,
}

impl FeedDocument {
    /// Href of the link with the given relation, if present.
    pub fn link(&self, relation: LinkRelation) -> Option<&str> {
        self.links
            .iter()
            .find(|link| link.rel == relation.as_str())
            .map(|link| link.href.as_str())
    }

    /// Render the document as XML.
    pub fn to_xml(&self) -> Result<String, FeedError> {
        quick_xml::se::to_string(self).map_err(|e| FeedError::Serialization(e.to_string()))
    }

    /// Parse a document previously rendered with [`FeedDocument::to_xml`].
    pub fn from_xml(xml: &str) -> Result<Self, FeedError> {
        quick_xml::de::from_str(xml).map_err(|e| FeedError::Serialization(e.to_string()))
    }
}

/// Document served for a single event retrieved by aggregate id and version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "event")]
pub struct EventDocument {
    #[serde(rename = "@xmlns", default = "event_namespace")]
    pub xmlns: String,

    #[serde(rename = "aggregateId")]
    pub aggregate_id: String,

    pub version: i64,

    pub published: String,

    pub typecode: String,

    /// Base64 payload.
    #[serde(default)]
    pub content: String,
}

impl EventDocument {
    pub fn to_xml(&self) -> Result<String, FeedError> {
        quick_xml::se::to_string(self).map_err(|e| FeedError::Serialization(e.to_string()))
    }

    pub fn from_xml(xml: &str) -> Result<Self, FeedError> {
        quick_xml::de::from_str(xml).map_err(|e| FeedError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_feed() -> FeedDocument {
        FeedDocument {
            xmlns: atom_namespace(),
            title: "Event store feed".to_string(),
            id: "feed-1".to_string(),
            links: vec![
                Link::new(LinkRelation::SelfLink, "https://host/notifications/feed-1"),
                Link::new(LinkRelation::NextArchive, "https://host/notifications/recent"),
            ],
            updated: None,
            entries: vec![Entry {
                title: "event".to_string(),
                id: "urn:esid:agg1:1".to_string(),
                links: vec![Link::new(LinkRelation::SelfLink, "https://host/events/agg1/1")],
                published: "2024-01-01T00:00:00.000000000Z".to_string(),
                content: Content {
                    content_type: "foo".to_string(),
                    body: "b2s=".to_string(),
                },
            }],
        }
    }

    #[test]
    fn test_feed_renders_atom_elements() {
        let xml = sample_feed().to_xml().unwrap();

        assert!(xml.starts_with(r#"<feed xmlns="http://www.w3.org/2005/Atom">"#));
        assert!(xml.contains(r#"<link rel="self" href="https://host/notifications/feed-1"/>"#));
        assert!(xml.contains(r#"<content type="foo">b2s=</content>"#));
        assert!(xml.contains("<id>urn:esid:agg1:1</id>"));
        assert!(!xml.contains("<updated>"));
    }

    #[test]
    fn test_feed_parses_back() {
        let feed = sample_feed();
        let parsed = FeedDocument::from_xml(&feed.to_xml().unwrap()).unwrap();

        assert_eq!(parsed, feed);
        assert_eq!(
            parsed.link(LinkRelation::NextArchive),
            Some("https://host/notifications/recent")
        );
        assert_eq!(parsed.link(LinkRelation::PrevArchive), None);
    }

    #[test]
    fn test_type_code_is_escaped() {
        let mut feed = sample_feed();
        feed.entries[0].content.content_type = "a&b".to_string();

        let xml = feed.to_xml().unwrap();
        assert!(xml.contains(r#"type="a&amp;b""#));
        assert_eq!(FeedDocument::from_xml(&xml).unwrap().entries[0].content.content_type, "a&b");
    }

    #[test]
    fn test_event_document_element_names() {
        let doc = EventDocument {
            xmlns: event_namespace(),
            aggregate_id: "1234567".to_string(),
            version: 1,
            published: "2024-01-01T00:00:00.000000000Z".to_string(),
            typecode: "foo".to_string(),
            content: "eWVhaCBvaw==".to_string(),
        };

        let xml = doc.to_xml().unwrap();
        assert!(xml.starts_with(r#"<event xmlns="urn:esatom:event">"#));
        assert!(xml.contains("<aggregateId>1234567</aggregateId>"));
        assert!(xml.contains("<version>1</version>"));
        assert!(xml.contains("<typecode>foo</typecode>"));
        assert_eq!(EventDocument::from_xml(&xml).unwrap(), doc);
    }
}
