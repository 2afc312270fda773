//! Types for the movie catalog.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification of a stored entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    Film,
    Documentary,
}

impl CatalogKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogKind::Film => "film",
            CatalogKind::Documentary => "documentary",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "film" => Some(CatalogKind::Film),
            "documentary" => Some(CatalogKind::Documentary),
            _ => None,
        }
    }

    /// All kinds, in display order.
    pub fn all() -> [CatalogKind; 2] {
        [CatalogKind::Film, CatalogKind::Documentary]
    }
}

/// Media type of a stored entry. Only movies for now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    #[default]
    Movie,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "movie" => Some(MediaKind::Movie),
            _ => None,
        }
    }
}

/// A persisted, matched catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Identity of the release within its source feed. Unique per entry.
    pub source_id: String,
    /// Canonical cross-catalog identifier (IMDb id). Entries without one
    /// are never listed. Deliberately NOT unique: re-releases of one title
    /// under distinct source ids are separate rows.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imdb_id: Option<String>,
    /// Metadata provider's internal id, kept for reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tmdb_id: Option<String>,
    pub catalog_kind: CatalogKind,
    pub media_kind: MediaKind,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backdrop_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    /// Provider genre ids, in provider ranking order.
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    /// Raw announced title, retained for display fallback.
    pub release_name: String,
    /// Insertion time, epoch milliseconds.
    pub added_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vote_average: Option<f64>,
}

/// Query for listing catalog entries.
#[derive(Debug, Clone)]
pub struct CatalogQuery {
    pub kind: CatalogKind,
    pub offset: u32,
    pub limit: u32,
    /// Case-insensitive substring match over title OR release name.
    pub search: Option<String>,
}

impl CatalogQuery {
    pub fn new(kind: CatalogKind) -> Self {
        Self {
            kind,
            offset: 0,
            limit: 100,
            search: None,
        }
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }
}

/// Errors for catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    Database(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_kind_roundtrip() {
        for kind in CatalogKind::all() {
            assert_eq!(CatalogKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(CatalogKind::parse("series"), None);
    }

    #[test]
    fn test_catalog_kind_serialization() {
        assert_eq!(
            serde_json::to_string(&CatalogKind::Film).unwrap(),
            "\"film\""
        );
        assert_eq!(
            serde_json::to_string(&CatalogKind::Documentary).unwrap(),
            "\"documentary\""
        );
    }

    #[test]
    fn test_media_kind_roundtrip() {
        assert_eq!(MediaKind::parse("movie"), Some(MediaKind::Movie));
        assert_eq!(MediaKind::parse("series"), None);
    }

    #[test]
    fn test_entry_serialization_skips_absent_fields() {
        let entry = CatalogEntry {
            source_id: "src-1".to_string(),
            imdb_id: None,
            tmdb_id: None,
            catalog_kind: CatalogKind::Film,
            media_kind: MediaKind::Movie,
            title: "Some Movie".to_string(),
            year: None,
            poster_url: None,
            backdrop_url: None,
            overview: None,
            genre_ids: vec![],
            release_name: "Some.Movie.2021".to_string(),
            added_at: 1,
            vote_average: None,
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("imdb_id"));
        assert!(!json.contains("poster_url"));
        assert!(json.contains("release_name"));
    }

    #[test]
    fn test_query_builder() {
        let query = CatalogQuery::new(CatalogKind::Film)
            .with_offset(20)
            .with_limit(10)
            .with_search("alien");
        assert_eq!(query.offset, 20);
        assert_eq!(query.limit, 10);
        assert_eq!(query.search.as_deref(), Some("alien"));
    }
}
