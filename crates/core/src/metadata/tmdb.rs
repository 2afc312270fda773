//! TMDB metadata provider implementation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::settings::SettingsStore;
use crate::transport::build_client;

use super::retry::{retry_on_rate_limit, RetryPolicy};
use super::{MetadataProvider, MovieMatch, ProviderError};

const API_BASE: &str = "https://api.themoviedb.org/3";
const IMAGE_BASE: &str = "https://image.tmdb.org/t/p";
const POSTER_SIZE: &str = "w500";
const BACKDROP_SIZE: &str = "original";

/// Timeout for a single metadata request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// TMDB search provider.
///
/// Settings (API key, language, proxy) are read on every call so operator
/// changes apply immediately.
pub struct TmdbProvider {
    settings: Arc<dyn SettingsStore>,
    base_url: String,
    retry: RetryPolicy,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<MovieResult>,
}

#[derive(Debug, Deserialize)]
struct MovieResult {
    id: u64,
    title: String,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    poster_path: Option<String>,
    #[serde(default)]
    backdrop_path: Option<String>,
    #[serde(default)]
    overview: Option<String>,
    #[serde(default)]
    genre_ids: Vec<u32>,
    #[serde(default)]
    vote_average: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ExternalIdsResponse {
    #[serde(default)]
    imdb_id: Option<String>,
}

impl TmdbProvider {
    pub fn new(settings: Arc<dyn SettingsStore>) -> Self {
        Self {
            settings,
            base_url: API_BASE.to_string(),
            retry: RetryPolicy::rate_limit_default(),
        }
    }

    /// Override the retry policy (tests use tiny backoffs).
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Point the provider at a different API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn build_search_url(&self, api_key: &str, title: &str, year: Option<&str>, language: &str) -> String {
        let mut url = format!(
            "{}/search/movie?api_key={}&query={}&language={}&include_adult=true",
            self.base_url,
            urlencoding::encode(api_key),
            urlencoding::encode(title),
            urlencoding::encode(language),
        );
        if let Some(year) = year {
            url.push_str(&format!("&year={}", urlencoding::encode(year)));
        }
        url
    }

    fn build_external_ids_url(&self, api_key: &str, provider_id: u64) -> String {
        format!(
            "{}/movie/{}/external_ids?api_key={}",
            self.base_url,
            provider_id,
            urlencoding::encode(api_key),
        )
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        client: &reqwest::Client,
        url: &str,
    ) -> Result<T, ProviderError> {
        let response = client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout
            } else {
                ProviderError::Request(e.to_string())
            }
        })?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(ProviderError::RateLimited);
        }
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }
}

/// Map a raw search result and its cross-reference id to canonical fields.
fn map_movie(movie: MovieResult, imdb_id: Option<String>) -> MovieMatch {
    MovieMatch {
        provider_id: movie.id,
        imdb_id: imdb_id.filter(|id| !id.is_empty()),
        title: movie.title,
        year: movie
            .release_date
            .filter(|d| d.len() >= 4)
            .map(|d| d[..4].to_string()),
        poster_url: movie
            .poster_path
            .map(|p| format!("{}/{}{}", IMAGE_BASE, POSTER_SIZE, p)),
        backdrop_url: movie
            .backdrop_path
            .map(|p| format!("{}/{}{}", IMAGE_BASE, BACKDROP_SIZE, p)),
        overview: movie.overview.filter(|o| !o.is_empty()),
        genre_ids: movie.genre_ids,
        vote_average: movie.vote_average,
    }
}

#[async_trait]
impl MetadataProvider for TmdbProvider {
    async fn search_movie(
        &self,
        title: &str,
        year: Option<&str>,
    ) -> Result<Option<MovieMatch>, ProviderError> {
        let settings = self
            .settings
            .load()
            .map_err(|e| ProviderError::Settings(e.to_string()))?;

        if settings.metadata_api_key.is_empty() {
            info!("No metadata API key configured");
            return Ok(None);
        }

        let client = build_client(&settings.proxy, REQUEST_TIMEOUT)
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        let search_url = self.build_search_url(
            &settings.metadata_api_key,
            title,
            year,
            &settings.metadata_language,
        );

        debug!(title, year, "Searching metadata provider");
        let response: SearchResponse =
            retry_on_rate_limit(&self.retry, || self.execute(&client, &search_url)).await?;

        let Some(movie) = response.results.into_iter().next() else {
            debug!(title, "No metadata results");
            return Ok(None);
        };

        // Resolve the cross-reference identifier via a second lookup.
        let ids_url = self.build_external_ids_url(&settings.metadata_api_key, movie.id);
        let external_ids: ExternalIdsResponse =
            match retry_on_rate_limit(&self.retry, || self.execute(&client, &ids_url)).await {
                Ok(ids) => ids,
                Err(e) => {
                    warn!(provider_id = movie.id, error = %e, "External id lookup failed");
                    return Err(e);
                }
            };

        Ok(Some(map_movie(movie, external_ids.imdb_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SqliteSettingsStore;

    fn provider() -> TmdbProvider {
        TmdbProvider::new(Arc::new(SqliteSettingsStore::in_memory().unwrap()))
    }

    fn sample_result() -> MovieResult {
        MovieResult {
            id: 603,
            title: "The Matrix".to_string(),
            release_date: Some("1999-03-30".to_string()),
            poster_path: Some("/poster.jpg".to_string()),
            backdrop_path: Some("/backdrop.jpg".to_string()),
            overview: Some("A hacker learns the truth.".to_string()),
            genre_ids: vec![28, 878],
            vote_average: Some(8.2),
        }
    }

    #[test]
    fn test_build_search_url_encodes_query() {
        let url = provider().build_search_url("key", "the matrix & more", Some("1999"), "en-US");
        assert!(url.starts_with("https://api.themoviedb.org/3/search/movie?api_key=key"));
        assert!(url.contains("query=the%20matrix%20%26%20more"));
        assert!(url.contains("language=en-US"));
        assert!(url.contains("include_adult=true"));
        assert!(url.ends_with("&year=1999"));
    }

    #[test]
    fn test_build_search_url_without_year() {
        let url = provider().build_search_url("key", "the matrix", None, "en-US");
        assert!(!url.contains("year="));
    }

    #[test]
    fn test_build_external_ids_url() {
        let url = provider().build_external_ids_url("key", 603);
        assert_eq!(
            url,
            "https://api.themoviedb.org/3/movie/603/external_ids?api_key=key"
        );
    }

    #[test]
    fn test_map_movie_full() {
        let movie = map_movie(sample_result(), Some("tt0133093".to_string()));
        assert_eq!(movie.provider_id, 603);
        assert_eq!(movie.imdb_id.as_deref(), Some("tt0133093"));
        assert_eq!(movie.year.as_deref(), Some("1999"));
        assert_eq!(
            movie.poster_url.as_deref(),
            Some("https://image.tmdb.org/t/p/w500/poster.jpg")
        );
        assert_eq!(
            movie.backdrop_url.as_deref(),
            Some("https://image.tmdb.org/t/p/original/backdrop.jpg")
        );
        assert_eq!(movie.genre_ids, vec![28, 878]);
        assert_eq!(movie.vote_average, Some(8.2));
    }

    #[test]
    fn test_map_movie_missing_fields() {
        let movie = map_movie(
            MovieResult {
                id: 1,
                title: "Bare".to_string(),
                release_date: None,
                poster_path: None,
                backdrop_path: None,
                overview: Some(String::new()),
                genre_ids: vec![],
                vote_average: None,
            },
            None,
        );
        assert!(movie.imdb_id.is_none());
        assert!(movie.year.is_none());
        assert!(movie.poster_url.is_none());
        // empty overview is treated as absent
        assert!(movie.overview.is_none());
    }

    #[test]
    fn test_map_movie_empty_imdb_id_is_absent() {
        let movie = map_movie(sample_result(), Some(String::new()));
        assert!(movie.imdb_id.is_none());
    }

    #[test]
    fn test_map_movie_short_release_date_ignored() {
        let mut result = sample_result();
        result.release_date = Some("19".to_string());
        let movie = map_movie(result, None);
        assert!(movie.year.is_none());
    }

    #[tokio::test]
    async fn test_search_without_api_key_returns_none() {
        // in-memory settings store has an empty API key by default; no
        // network call is made.
        let result = provider().search_movie("the matrix", None).await.unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_search_response_tolerates_missing_results() {
        let parsed: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.results.is_empty());

        let parsed: SearchResponse = serde_json::from_str(
            r#"{"page":1,"results":[{"id":603,"title":"The Matrix"}],"total_results":1}"#,
        )
        .unwrap();
        assert_eq!(parsed.results.len(), 1);
        assert_eq!(parsed.results[0].id, 603);
    }

    #[test]
    fn test_external_ids_response_null_imdb() {
        let parsed: ExternalIdsResponse =
            serde_json::from_str(r#"{"imdb_id":null,"wikidata_id":"Q83495"}"#).unwrap();
        assert!(parsed.imdb_id.is_none());
    }
}
