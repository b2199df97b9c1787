//! Outbound "request this title" calls to a fulfillment service.

mod overseerr;

pub use overseerr::OverseerrClient;

use crate::catalog::MediaKind;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Media id {0:?} is not numeric")]
    InvalidMediaId(String),

    #[error("Fulfillment service returned status {status}")]
    Upstream { status: u16 },

    #[error("Fulfillment service unreachable: {0}")]
    Unreachable(String),
}

#[async_trait]
pub trait MediaRequester: Send + Sync {
    /// Files a request for the title and returns the service's response body.
    async fn request_media(
        &self,
        media_id: &str,
        kind: MediaKind,
    ) -> Result<serde_json::Value, RequestError>;
}
