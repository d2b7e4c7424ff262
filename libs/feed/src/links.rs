//! Paging link relations and cache policy.

use crate::{assembler::RECENT_FEED_ID, Link};

/// Link relations used by the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkRelation {
    SelfLink,
    Related,
    PrevArchive,
    NextArchive,
}

impl LinkRelation {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkRelation::SelfLink => "self",
            LinkRelation::Related => "related",
            LinkRelation::PrevArchive => "prev-archive",
            LinkRelation::NextArchive => "next-archive",
        }
    }
}

impl std::fmt::Display for LinkRelation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Neighbours of an archive page, as reported by the event store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageLinkage {
    pub page_id: String,

    /// Older page, if any.
    pub previous_page_id: Option<String>,

    /// Newer page. `None` means `recent` is next.
    pub next_page_id: Option<String>,
}

impl PageLinkage {
    pub fn new(
        page_id: impl Into<String>,
        previous_page_id: Option<String>,
        next_page_id: Option<String>,
    ) -> Self {
        Self {
            page_id: page_id.into(),
            previous_page_id: non_empty(previous_page_id),
            next_page_id: non_empty(next_page_id),
        }
    }
}

fn non_empty(id: Option<String>) -> Option<String> {
    id.filter(|id| !id.is_empty())
}

/// HTTP caching policy for a rendered resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachePolicy {
    /// Mutable content; never cache.
    NoStore,

    /// Frozen content, cacheable for [`CachePolicy::IMMUTABLE_MAX_AGE_SECS`].
    Immutable { etag: String },
}

impl CachePolicy {
    /// 30 days.
    pub const IMMUTABLE_MAX_AGE_SECS: u64 = 2_592_000;

    /// Policy for a feed page: `recent` is never cached, archive pages are.
    pub fn for_page(page_id: &str) -> Self {
        if page_id == RECENT_FEED_ID {
            CachePolicy::NoStore
        } else {
            CachePolicy::Immutable {
                etag: page_id.to_string(),
            }
        }
    }

    /// Policy for a single event resource.
    pub fn for_event(aggregate_id: &str, version: i64) -> Self {
        CachePolicy::Immutable {
            etag: format!("{aggregate_id}:{version}"),
        }
    }

    /// Value of the `Cache-Control` header.
    pub fn cache_control(&self) -> String {
        match self {
            CachePolicy::NoStore => "no-store".to_string(),
            CachePolicy::Immutable { .. } => {
                format!("max-age={}", Self::IMMUTABLE_MAX_AGE_SECS)
            }
        }
    }

    /// Value of the `ETag` header, if one should be sent.
    pub fn etag(&self) -> Option<&str> {
        match self {
            CachePolicy::NoStore => None,
            CachePolicy::Immutable { etag } => Some(etag),
        }
    }
}

/// Links and cache policy for one archive page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveLinks {
    pub links: Vec<Link>,
    pub cache: CachePolicy,
}

/// Builds link hrefs relative to the public base URL (`{proto}://{linkhost}`).
///
/// The link host can differ from the listen address so that links reflect a
/// proxy in front of the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedLinks {
    base_url: String,
}

impl FeedLinks {
    pub fn new(link_proto: &str, link_host: &str) -> Self {
        Self::from_base_url(format!("{link_proto}://{link_host}"))
    }

    pub fn from_base_url(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base}/notifications/{page_id}`
    pub fn page(&self, page_id: &str) -> String {
        format!("{}/notifications/{}", self.base_url, page_id)
    }

    /// `{base}/events/{aggregate_id}/{version}`
    pub fn event(&self, aggregate_id: &str, version: i64) -> String {
        format!("{}/events/{}/{}", self.base_url, aggregate_id, version)
    }

    /// Links for the recent feed: self, related, and prev-archive when a page exists.
    pub fn recent_links(&self, last_page_id: Option<&str>) -> Vec<Link> {
        let recent = self.page(RECENT_FEED_ID);
        let mut links = vec![
            Link::new(LinkRelation::SelfLink, recent.clone()),
            Link::new(LinkRelation::Related, recent),
        ];

        if let Some(last) = last_page_id.filter(|id| !id.is_empty()) {
            links.push(Link::new(LinkRelation::PrevArchive, self.page(last)));
        }

        links
    }

    /// Links and cache policy for an archive page.
    ///
    /// `next-archive` is always present; it points at `recent` when no newer
    /// page has been assigned yet.
    pub fn archive_links(&self, page_id: &str, linkage: &PageLinkage) -> ArchiveLinks {
        let mut links = vec![Link::new(LinkRelation::SelfLink, self.page(page_id))];

        if let Some(previous) = linkage.previous_page_id.as_deref().filter(|id| !id.is_empty()) {
            links.push(Link::new(LinkRelation::PrevArchive, self.page(previous)));
        }

        let next = linkage
            .next_page_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .unwrap_or(RECENT_FEED_ID);
        links.push(Link::new(LinkRelation::NextArchive, self.page(next)));

        ArchiveLinks {
            links,
            cache: CachePolicy::for_page(page_id),
        }
    }
}
