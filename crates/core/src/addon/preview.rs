//! Catalog responses in the client's preview-record format.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{CatalogEntry, CatalogError, CatalogQuery, CatalogStore};

use super::manifest::catalog_kind_for_id;

/// Page size for catalog responses.
pub const PAGE_LIMIT: u32 = 10_000;

const PLACEHOLDER_POSTER: &str = "https://via.placeholder.com/300x450?text=No+Poster";

/// A preview record as consumed by the media-center client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaPreview {
    /// Canonical external id.
    pub id: String,
    #[serde(rename = "type")]
    pub media_type: String,
    pub name: String,
    pub poster: String,
    #[serde(rename = "releaseInfo", skip_serializing_if = "Option::is_none")]
    pub release_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
}

/// A catalog response: a list of preview records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogResponse {
    pub metas: Vec<MetaPreview>,
}

/// Provider genre id to display name. Unknown ids are dropped.
fn genre_name(id: u32) -> Option<&'static str> {
    match id {
        28 => Some("Action"),
        12 => Some("Adventure"),
        16 => Some("Animation"),
        35 => Some("Comedy"),
        80 => Some("Crime"),
        99 => Some("Documentary"),
        18 => Some("Drama"),
        10751 => Some("Family"),
        14 => Some("Fantasy"),
        36 => Some("History"),
        27 => Some("Horror"),
        10402 => Some("Music"),
        9648 => Some("Mystery"),
        10749 => Some("Romance"),
        878 => Some("Sci-Fi"),
        10770 => Some("TV Movie"),
        53 => Some("Thriller"),
        10752 => Some("War"),
        37 => Some("Western"),
        _ => None,
    }
}

/// Transform a catalog entry into a preview record.
///
/// Returns `None` for entries without a canonical id (the store's listing
/// queries already exclude them; this guards direct callers).
pub fn to_meta_preview(entry: &CatalogEntry) -> Option<MetaPreview> {
    let id = entry.imdb_id.clone()?;

    let genres: Vec<String> = entry
        .genre_ids
        .iter()
        .filter_map(|&g| genre_name(g))
        .map(str::to_string)
        .collect();

    // The raw release name stands in when the provider had no synopsis.
    let description = match entry.overview {
        Some(ref overview) => Some(overview.clone()),
        None => Some(format!("Release: {}", entry.release_name)),
    };

    Some(MetaPreview {
        id,
        media_type: entry.media_kind.as_str().to_string(),
        name: entry.title.clone(),
        poster: entry
            .poster_url
            .clone()
            .unwrap_or_else(|| PLACEHOLDER_POSTER.to_string()),
        release_info: entry.year.clone(),
        genres: if genres.is_empty() { None } else { Some(genres) },
        description,
        background: entry.backdrop_url.clone(),
    })
}

/// Serve one catalog page.
///
/// Unknown catalog ids yield an empty response rather than an error, so a
/// stale client installation degrades gracefully.
pub fn handle_catalog(
    store: &dyn CatalogStore,
    catalog_id: &str,
    skip: u32,
    search: Option<&str>,
) -> Result<CatalogResponse, CatalogError> {
    let Some(kind) = catalog_kind_for_id(catalog_id) else {
        debug!(catalog_id, "Unknown catalog id");
        return Ok(CatalogResponse { metas: Vec::new() });
    };

    // Fetch one extra row to detect whether more pages exist.
    let mut query = CatalogQuery::new(kind)
        .with_offset(skip)
        .with_limit(PAGE_LIMIT + 1);
    if let Some(term) = search {
        if !term.trim().is_empty() {
            query = query.with_search(term.trim());
        }
    }

    let mut entries = store.list(&query)?;
    let has_more = entries.len() as u32 > PAGE_LIMIT;
    if has_more {
        entries.truncate(PAGE_LIMIT as usize);
    }

    let metas: Vec<MetaPreview> = entries.iter().filter_map(to_meta_preview).collect();
    debug!(
        catalog_id,
        skip,
        count = metas.len(),
        has_more,
        "Serving catalog page"
    );

    Ok(CatalogResponse { metas })
}
