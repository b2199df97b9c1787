use super::{MediaRequester, RequestError};
use crate::catalog::MediaKind;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateRequestBody<'a> {
    media_id: u64,
    media_type: &'a str,
}

/// Overseerr names shows "tv".
fn overseerr_media_type(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Movie => "movie",
        MediaKind::Show => "tv",
    }
}

pub struct OverseerrClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OverseerrClient {
    pub fn new(base_url: &str, api_key: &str, timeout_sec: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl MediaRequester for OverseerrClient {
    async fn request_media(
        &self,
        media_id: &str,
        kind: MediaKind,
    ) -> Result<serde_json::Value, RequestError> {
        let media_id_num: u64 = media_id
            .trim()
            .parse()
            .map_err(|_| RequestError::InvalidMediaId(media_id.to_string()))?;

        let url = format!("{}/api/v1/request", self.base_url);
        debug!("Requesting {} {} from Overseerr", kind, media_id_num);

        let response = self
            .client
            .post(&url)
            .header("X-Api-Key", &self.api_key)
            .json(&CreateRequestBody {
                media_id: media_id_num,
                media_type: overseerr_media_type(kind),
            })
            .send()
            .await
            .map_err(|e| RequestError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RequestError::Upstream {
                status: status.as_u16(),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| RequestError::Unreachable(e.to_string()))?;
        info!("Overseerr accepted request for {} {}", kind, media_id_num);
        // Overseerr answers with JSON; keep whatever it sent otherwise.
        Ok(serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text)))
    }
}
