//! TMDb API client for movie details.

use super::{json_str, MetadataProvider, ProviderLookupError};
use crate::catalog::MediaDetails;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

pub const TMDB_API_BASE: &str = "https://api.themoviedb.org/3";
pub const TMDB_IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w500";

pub struct TmdbClient {
    client: Client,
    base_url: String,
    image_base_url: String,
    api_key: String,
}

impl TmdbClient {
    /// Create a new TMDb client.
    ///
    /// # Arguments
    /// * `api_key` - TMDb v3 API key
    /// * `base_url` - API base URL (e.g., "https://api.themoviedb.org/3")
    /// * `timeout_sec` - Request timeout in seconds
    pub fn new(api_key: &str, base_url: &str, timeout_sec: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            image_base_url: TMDB_IMAGE_BASE.to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn with_image_base_url(mut self, image_base_url: &str) -> Self {
        self.image_base_url = image_base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn normalize(&self, raw: serde_json::Value) -> MediaDetails {
        let poster = json_str(&raw, "poster_path");
        let poster_url = poster
            .as_ref()
            .map(|path| format!("{}{}", self.image_base_url, path));

        MediaDetails {
            poster,
            poster_url,
            overview: json_str(&raw, "overview"),
            release_date: json_str(&raw, "release_date"),
            cached_poster: None,
            raw,
        }
    }
}

#[async_trait]
impl MetadataProvider for TmdbClient {
    fn name(&self) -> &str {
        "tmdb"
    }

    async fn fetch_details(&self, id: &str) -> Result<MediaDetails, ProviderLookupError> {
        debug!("Fetching {} TMDb details...", id);

        let url = format!("{}/movie/{}", self.base_url, urlencoding::encode(id));
        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("language", "en-US")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderLookupError::from_status(response.status()));
        }

        let raw: serde_json::Value = response.json().await?;
        if !raw.is_object() {
            return Err(ProviderLookupError::InvalidResponse(
                "expected a JSON object".to_string(),
            ));
        }

        Ok(self.normalize(raw))
    }
}
