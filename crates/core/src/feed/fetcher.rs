//! Feed fetcher implementation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::release;
use crate::settings::SettingsStore;
use crate::transport::build_client;

use super::types::{RssDocument, RssItem};
use super::{FeedError, FeedSource, ReleaseDescriptor};

/// Timeout for a single feed request.
const FEED_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches and parses the configured RSS feeds.
///
/// Settings are read on every pass so operator changes apply to the next
/// run without a restart.
pub struct FeedFetcher {
    settings: Arc<dyn SettingsStore>,
}

impl FeedFetcher {
    pub fn new(settings: Arc<dyn SettingsStore>) -> Self {
        Self { settings }
    }

    /// Fetch one feed URL and parse its items into descriptors.
    async fn fetch_source(
        &self,
        client: &reqwest::Client,
        url: &str,
    ) -> Result<Vec<ReleaseDescriptor>, FeedError> {
        debug!(url, "Fetching RSS feed");

        let response = client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FeedError::Timeout
            } else {
                FeedError::Request(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FeedError::Request(e.to_string()))?;

        let items = parse_feed(&body)?;
        Ok(items.iter().map(descriptor_from_item).collect())
    }
}

#[async_trait]
impl FeedSource for FeedFetcher {
    async fn fetch_all(&self) -> Vec<ReleaseDescriptor> {
        let settings = match self.settings.load() {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "Failed to load settings, skipping feed fetch");
                return Vec::new();
            }
        };

        let mut urls = Vec::new();
        if !settings.feed_url.trim().is_empty() {
            urls.push(settings.feed_url.clone());
        } else {
            info!("No primary feed URL configured");
        }
        urls.extend(settings.additional_feed_urls.iter().cloned());

        let client = match build_client(&settings.proxy, FEED_TIMEOUT) {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to build HTTP client, skipping feed fetch");
                return Vec::new();
            }
        };

        let mut all = Vec::new();
        for url in &urls {
            match self.fetch_source(&client, url.trim()).await {
                Ok(descriptors) => {
                    info!(url, count = descriptors.len(), "Fetched feed");
                    all.extend(descriptors);
                }
                Err(e) => {
                    warn!(url, error = %e, "Failed to fetch feed, skipping source");
                }
            }
        }
        all
    }
}

/// Parse an RSS document into its item list.
///
/// A feed without a channel or items yields an empty list; malformed XML is
/// an error.
pub(crate) fn parse_feed(xml: &str) -> Result<Vec<RssItem>, FeedError> {
    let document: RssDocument =
        quick_xml::de::from_str(xml).map_err(|e| FeedError::Parse(e.to_string()))?;
    Ok(document.channel.map(|c| c.items).unwrap_or_default())
}

/// Assemble a descriptor from a feed item.
///
/// Identity preference: guid text over link. Items without a usable title
/// still produce a descriptor; the empty clean name fails fast downstream.
pub(crate) fn descriptor_from_item(item: &RssItem) -> ReleaseDescriptor {
    let title = item.title.clone().unwrap_or_default();
    let parsed = release::parse(&title);

    let source_id = item
        .guid
        .as_ref()
        .and_then(|g| g.value.as_ref())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| {
            item.link
                .as_ref()
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty())
        })
        .unwrap_or_default();

    let catalog_kind = if parsed.is_documentary {
        crate::catalog::CatalogKind::Documentary
    } else {
        crate::catalog::CatalogKind::Film
    };

    ReleaseDescriptor {
        release_name: title,
        source_id,
        clean_name: parsed.clean_name,
        year: parsed.year,
        catalog_kind,
        media_kind: crate::catalog::MediaKind::Movie,
        published_at: item.pub_date.clone(),
    }
}
