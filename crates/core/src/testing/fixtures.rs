//! Shared test fixtures.

use chrono::Utc;

use crate::catalog::{CatalogEntry, CatalogKind, MediaKind};
use crate::feed::ReleaseDescriptor;
use crate::metadata::MovieMatch;

/// A film descriptor with a plausible release name.
pub fn descriptor(source_id: &str, clean_name: &str) -> ReleaseDescriptor {
    ReleaseDescriptor {
        release_name: format!(
            "{}.2021.FRENCH.1080p.BluRay.x264-GRP",
            clean_name.replace(' ', ".")
        ),
        source_id: source_id.to_string(),
        clean_name: clean_name.to_string(),
        year: Some("2021".to_string()),
        catalog_kind: CatalogKind::Film,
        media_kind: MediaKind::Movie,
        published_at: None,
    }
}

/// A documentary descriptor.
pub fn documentary_descriptor(source_id: &str, clean_name: &str) -> ReleaseDescriptor {
    let mut d = descriptor(source_id, clean_name);
    d.catalog_kind = CatalogKind::Documentary;
    d
}

/// A fully-populated provider match.
pub fn movie_match(provider_id: u64, imdb_id: &str, title: &str) -> MovieMatch {
    MovieMatch {
        provider_id,
        imdb_id: if imdb_id.is_empty() {
            None
        } else {
            Some(imdb_id.to_string())
        },
        title: title.to_string(),
        year: Some("2021".to_string()),
        poster_url: Some(format!("https://image.tmdb.org/t/p/w500/{}.jpg", provider_id)),
        backdrop_url: Some(format!(
            "https://image.tmdb.org/t/p/original/{}.jpg",
            provider_id
        )),
        overview: Some(format!("Overview of {}.", title)),
        genre_ids: vec![18],
        vote_average: Some(7.1),
    }
}

/// A valid, listable catalog entry.
pub fn catalog_entry(source_id: &str, title: &str) -> CatalogEntry {
    CatalogEntry {
        source_id: source_id.to_string(),
        imdb_id: Some(format!("tt{:07}", source_id.len())),
        tmdb_id: Some("603".to_string()),
        catalog_kind: CatalogKind::Film,
        media_kind: MediaKind::Movie,
        title: title.to_string(),
        year: Some("2021".to_string()),
        poster_url: Some("https://image.tmdb.org/t/p/w500/p.jpg".to_string()),
        backdrop_url: None,
        overview: None,
        genre_ids: vec![18, 53],
        release_name: format!("{}.2021.1080p.BluRay.x264-GRP", title.replace(' ', ".")),
        added_at: Utc::now().timestamp_millis(),
        vote_average: Some(7.5),
    }
}
