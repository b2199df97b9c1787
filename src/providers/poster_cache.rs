//! Local poster caching.
//!
//! Posters are stored as `{kind}_{id}{ext}` inside the cache directory and
//! served by the HTTP layer under `/images`.

use super::{MetadataProvider, ProviderLookupError};
use crate::catalog::{MediaDetails, MediaKind};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use std::io::Write;
use tracing::{debug, warn};

/// URL prefix under which cached posters are served.
pub const POSTERS_URL_PREFIX: &str = "/images";

/// File name for a cached poster. The extension comes from the poster path,
/// defaulting to `.jpg`.
pub fn poster_file_name(kind: MediaKind, id: &str, poster: &str) -> String {
    let ext = Path::new(poster.split(['?', '#']).next().unwrap_or(poster))
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or("jpg");
    let safe_id: String = id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    format!("{}_{}.{}", kind, safe_id, ext)
}

pub struct PosterCache {
    client: Client,
    dir: PathBuf,
}

impl PosterCache {
    pub fn new(dir: impl Into<PathBuf>, timeout_sec: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()?;
        Ok(Self {
            client,
            dir: dir.into(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Downloads the poster unless already cached. Returns the URL path the
    /// HTTP layer serves it under.
    pub async fn cache(&self, kind: MediaKind, id: &str, poster_url: &str) -> Result<String> {
        let file_name = poster_file_name(kind, id, poster_url);
        let dest = self.dir.join(&file_name);
        let served_path = format!("{}/{}", POSTERS_URL_PREFIX, file_name);

        if tokio::fs::try_exists(&dest).await.unwrap_or(false) {
            debug!("Poster {} already cached", file_name);
            return Ok(served_path);
        }

        let response = self
            .client
            .get(poster_url)
            .send()
            .await
            .context("Failed to connect for poster download")?;
        if !response.status().is_success() {
            anyhow::bail!("Poster download failed with status: {}", response.status());
        }
        let bytes = response
            .bytes()
            .await
            .context("Failed to read poster body")?;

        let dir = self.dir.clone();
        tokio::task::spawn_blocking(move || write_poster(&dir, &dest, &bytes))
            .await
            .context("Poster write task failed")??;

        Ok(served_path)
    }
}

/// Writes through a temp file in `dir` so `dest` only ever appears complete.
fn write_poster(dir: &Path, dest: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::create_dir_all(dir).context("Failed to create poster directory")?;
    let mut temp =
        tempfile::NamedTempFile::new_in(dir).context("Failed to create poster temp file")?;
    temp.write_all(bytes)
        .context("Failed to write poster file")?;
    temp.as_file()
        .sync_all()
        .context("Failed to flush poster file")?;
    temp.persist(dest)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to move poster into {:?}", dest))?;
    Ok(())
}

/// Wraps a provider and caches the poster of every successful lookup.
///
/// A failed poster download leaves `cached_poster` empty and never fails the
/// lookup itself.
pub struct PosterCachingProvider {
    inner: Arc<dyn MetadataProvider>,
    kind: MediaKind,
    posters: Arc<PosterCache>,
}

impl PosterCachingProvider {
    pub fn new(inner: Arc<dyn MetadataProvider>, kind: MediaKind, posters: Arc<PosterCache>) -> Self {
        Self {
            inner,
            kind,
            posters,
        }
    }
}

#[async_trait]
impl MetadataProvider for PosterCachingProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn fetch_details(&self, id: &str) -> Result<MediaDetails, ProviderLookupError> {
        let mut details = self.inner.fetch_details(id).await?;

        if let Some(poster_url) = details.poster_url.clone() {
            match self.posters.cache(self.kind, id, &poster_url).await {
                Ok(path) => details.cached_poster = Some(path),
                Err(err) => warn!("Failed to cache poster for {} {}: {:#}", self.kind, id, err),
            }
        }

        Ok(details)
    }
}
