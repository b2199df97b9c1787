//! Metadata provider clients.
//!
//! - TMDb: movie details by TMDb id
//! - TVDb: show details by TVDb id (v4 API, token login)
//!
//! Both implement [`MetadataProvider`]. A lookup is a single outbound request
//! with no retry; callers only see whether details are present.

mod poster_cache;
mod tmdb;
mod tvdb;

pub use poster_cache::{poster_file_name, PosterCache, PosterCachingProvider, POSTERS_URL_PREFIX};
pub use tmdb::{TmdbClient, TMDB_API_BASE, TMDB_IMAGE_BASE};
pub use tvdb::{TvdbClient, TVDB_API_BASE};

use crate::catalog::MediaDetails;
use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::warn;

/// Why a provider lookup produced no details.
#[derive(Debug, Error)]
pub enum ProviderLookupError {
    #[error("Not found")]
    NotFound,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Rate limited")]
    RateLimited,

    #[error("Unreachable: {0}")]
    Unreachable(String),

    #[error("Unexpected status {0}")]
    UnexpectedStatus(u16),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ProviderLookupError {
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::NOT_FOUND => ProviderLookupError::NotFound,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderLookupError::Unauthorized,
            StatusCode::TOO_MANY_REQUESTS => ProviderLookupError::RateLimited,
            other => ProviderLookupError::UnexpectedStatus(other.as_u16()),
        }
    }
}

impl From<reqwest::Error> for ProviderLookupError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ProviderLookupError::InvalidResponse(err.to_string())
        } else {
            ProviderLookupError::Unreachable(err.to_string())
        }
    }
}

#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Provider name used in logs (e.g. "tmdb").
    fn name(&self) -> &str;

    /// Fetch details for an external id.
    async fn fetch_details(&self, id: &str) -> Result<MediaDetails, ProviderLookupError>;

    /// Like [`fetch_details`](Self::fetch_details), with the failure logged
    /// and folded into `None`.
    async fn lookup(&self, id: &str) -> Option<MediaDetails> {
        match self.fetch_details(id).await {
            Ok(details) => Some(details),
            Err(err) => {
                warn!("{} lookup failed for {}: {}", self.name(), id, err);
                None
            }
        }
    }
}

/// Reads an optional, non-empty string field from a JSON object.
pub(crate) fn json_str(value: &serde_json::Value, field: &str) -> Option<String> {
    value
        .get(field)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}
