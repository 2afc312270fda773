//! Types for the feed layer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{CatalogKind, MediaKind};

/// A single announced release, as extracted from a feed item.
///
/// Ephemeral: produced by the feed fetcher, consumed once per sync run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseDescriptor {
    /// Raw announced title.
    pub release_name: String,
    /// Stable identity of the release within its source feed, derived from
    /// the item's guid or link. Empty string if the item had neither; such
    /// descriptors are counted failed downstream.
    pub source_id: String,
    /// Title with technical tags stripped, used as the search query.
    pub clean_name: String,
    /// Four-digit year, if present in the title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    pub catalog_kind: CatalogKind,
    pub media_kind: MediaKind,
    /// Publication date as announced by the feed, verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
}

/// Errors for a single feed fetch.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Feed request failed: {0}")]
    Request(String),

    #[error("Feed request timed out")]
    Timeout,

    #[error("Feed returned HTTP {0}")]
    Status(u16),

    #[error("Failed to parse feed XML: {0}")]
    Parse(String),
}

/// RSS document model, tolerant of missing parts.
///
/// quick-xml collects repeated `<item>` elements into the vector, so a
/// feed with a single entry still yields a one-element list.
#[derive(Debug, Deserialize)]
pub(crate) struct RssDocument {
    pub channel: Option<RssChannel>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RssChannel {
    #[serde(default, rename = "item")]
    pub items: Vec<RssItem>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RssItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub guid: Option<RssGuid>,
    #[serde(default, rename = "pubDate")]
    pub pub_date: Option<String>,
}

/// A guid element; may carry attributes (e.g. `isPermaLink`) or be a bare
/// string. Only the text content matters for identity.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RssGuid {
    #[serde(default, rename = "$text")]
    pub value: Option<String>,
}
