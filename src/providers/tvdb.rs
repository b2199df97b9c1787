//! TVDb v4 API client for show details.
//!
//! The API key is exchanged for a bearer token via `/login`. The token is
//! cached until it expires or a lookup is rejected with 401.

use super::{json_str, MetadataProvider, ProviderLookupError};
use crate::catalog::MediaDetails;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};

pub const TVDB_API_BASE: &str = "https://api4.thetvdb.com/v4";
const TVDB_ARTWORK_BASE: &str = "https://artworks.thetvdb.com";
const TOKEN_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

#[derive(Serialize)]
struct LoginBody<'a> {
    apikey: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pin: Option<&'a str>,
}

#[derive(Deserialize)]
struct LoginResponse {
    data: Option<LoginData>,
}

#[derive(Deserialize)]
struct LoginData {
    token: Option<String>,
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

pub struct TvdbClient {
    client: Client,
    base_url: String,
    api_key: String,
    pin: Option<String>,
    token: Mutex<Option<CachedToken>>,
}

impl TvdbClient {
    pub fn new(api_key: &str, pin: Option<&str>, base_url: &str, timeout_sec: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            pin: pin.map(|p| p.to_string()),
            token: Mutex::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns a valid bearer token, logging in if needed.
    ///
    /// The lock is held across the login so concurrent lookups share one login.
    async fn bearer_token(&self) -> Result<String, ProviderLookupError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.expires_at {
                return Ok(token.value.clone());
            }
        }

        let url = format!("{}/login", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&LoginBody {
                apikey: &self.api_key,
                pin: self.pin.as_deref(),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(match response.status() {
                StatusCode::TOO_MANY_REQUESTS => ProviderLookupError::RateLimited,
                status if status.is_client_error() => ProviderLookupError::Unauthorized,
                status => ProviderLookupError::UnexpectedStatus(status.as_u16()),
            });
        }

        let body: LoginResponse = response.json().await?;
        let value = body
            .data
            .and_then(|d| d.token)
            .filter(|t| !t.is_empty())
            .ok_or(ProviderLookupError::Unauthorized)?;

        info!("Obtained TVDb token");
        *cached = Some(CachedToken {
            value: value.clone(),
            expires_at: Instant::now() + TOKEN_TTL,
        });
        Ok(value)
    }

    async fn forget_token(&self) {
        *self.token.lock().await = None;
    }

    fn normalize(raw: serde_json::Value) -> MediaDetails {
        let data = raw.get("data").cloned().unwrap_or(serde_json::Value::Null);
        let poster = json_str(&data, "image");
        let poster_url = poster.as_ref().map(|image| {
            if image.starts_with("http://") || image.starts_with("https://") {
                image.clone()
            } else {
                format!("{}{}", TVDB_ARTWORK_BASE, image)
            }
        });

        MediaDetails {
            poster,
            poster_url,
            overview: json_str(&data, "overview"),
            release_date: json_str(&data, "firstAired"),
            cached_poster: None,
            raw: data,
        }
    }
}

#[async_trait]
impl MetadataProvider for TvdbClient {
    fn name(&self) -> &str {
        "tvdb"
    }

    async fn fetch_details(&self, id: &str) -> Result<MediaDetails, ProviderLookupError> {
        debug!("Fetching {} TVDb details...", id);

        let token = self.bearer_token().await?;
        let url = format!("{}/series/{}", self.base_url, urlencoding::encode(id));
        let response = self.client.get(&url).bearer_auth(token).send().await?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::UNAUTHORIZED => {
                self.forget_token().await;
                return Err(ProviderLookupError::Unauthorized);
            }
            status => return Err(ProviderLookupError::from_status(status)),
        }

        let raw: serde_json::Value = response.json().await?;
        if !raw.get("data").map(|d| d.is_object()).unwrap_or(false) {
            return Err(ProviderLookupError::InvalidResponse(
                "missing \"data\" object".to_string(),
            ));
        }

        Ok(Self::normalize(raw))
    }
}
