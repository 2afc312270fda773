//! Types for the metadata layer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A provider search result mapped to canonical fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieMatch {
    /// The provider's internal id.
    pub provider_id: u64,
    /// Cross-catalog identifier (IMDb id). A match without one is treated
    /// as unmatched by the batch driver: the catalog's public identity
    /// space requires it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imdb_id: Option<String>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backdrop_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vote_average: Option<f64>,
}

/// Errors for metadata provider calls.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Metadata request failed: {0}")]
    Request(String),

    #[error("Metadata request timed out")]
    Timeout,

    #[error("Metadata provider rate limit hit")]
    RateLimited,

    #[error("Metadata provider returned HTTP {0}")]
    Status(u16),

    #[error("Invalid metadata response: {0}")]
    InvalidResponse(String),

    #[error("Rate limit retries exhausted after {0} attempts")]
    RetriesExhausted(u32),

    #[error("Settings error: {0}")]
    Settings(String),
}
