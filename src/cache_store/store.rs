use crate::catalog::CacheDocument;
use crate::grouping::GroupingEngine;
use crate::manifest::parse_manifest_dir;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Failed to write cache file {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode cache document: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Failed to remove cache file {path:?}: {source}")]
    Invalidate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cache write task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Why a persisted cache was treated as absent.
#[derive(Debug, Error)]
pub enum CacheDecodeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed cache document: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Owns the cache file. Only [`rebuild`](Self::rebuild) writes it, and
/// rebuilds are serialized so concurrent cold starts trigger one pass.
pub struct CacheStore {
    cache_path: PathBuf,
    manifests_dir: PathBuf,
    engine: Arc<GroupingEngine>,
    rebuild_lock: Mutex<()>,
}

impl CacheStore {
    pub fn new(
        cache_path: impl Into<PathBuf>,
        manifests_dir: impl Into<PathBuf>,
        engine: Arc<GroupingEngine>,
    ) -> Self {
        Self {
            cache_path: cache_path.into(),
            manifests_dir: manifests_dir.into(),
            engine,
            rebuild_lock: Mutex::new(()),
        }
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    pub fn manifests_dir(&self) -> &Path {
        &self.manifests_dir
    }

    async fn load(&self) -> Result<CacheDocument, CacheDecodeError> {
        let bytes = tokio::fs::read(&self.cache_path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// The persisted document, or `None` when the file is missing or does not
    /// decode.
    pub async fn read(&self) -> Option<CacheDocument> {
        match self.load().await {
            Ok(doc) => Some(doc),
            Err(CacheDecodeError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("No cache file at {:?}", self.cache_path);
                None
            }
            Err(err) => {
                warn!("Ignoring cache file {:?}: {}", self.cache_path, err);
                None
            }
        }
    }

    /// Runs a full ingestion pass and replaces the persisted document.
    pub async fn rebuild(&self) -> Result<CacheDocument, CacheError> {
        let _guard = self.rebuild_lock.lock().await;
        self.rebuild_locked().await
    }

    async fn rebuild_locked(&self) -> Result<CacheDocument, CacheError> {
        info!("Rebuilding cache from {:?}", self.manifests_dir);
        let scan = parse_manifest_dir(&self.manifests_dir).await;
        if !scan.skipped.is_empty() {
            warn!("{} manifest(s) skipped", scan.skipped.len());
        }

        let (document, _report) = self.engine.group(&scan.documents).await;
        self.persist(&document).await?;
        info!(
            "Cache written to {:?} ({} records)",
            self.cache_path,
            document.len()
        );
        Ok(document)
    }

    /// Returns the persisted document, building it first on a miss.
    pub async fn get_or_build(&self) -> Result<CacheDocument, CacheError> {
        if let Some(doc) = self.read().await {
            return Ok(doc);
        }

        let _guard = self.rebuild_lock.lock().await;
        // Another caller may have finished a rebuild while we waited.
        if let Some(doc) = self.read().await {
            return Ok(doc);
        }
        self.rebuild_locked().await
    }

    /// Deletes the persisted document so the next read rebuilds it.
    pub async fn invalidate(&self) -> Result<(), CacheError> {
        let _guard = self.rebuild_lock.lock().await;
        match tokio::fs::remove_file(&self.cache_path).await {
            Ok(()) => {
                info!("Cache file {:?} removed", self.cache_path);
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(CacheError::Invalidate {
                path: self.cache_path.clone(),
                source,
            }),
        }
    }

    /// Writes to a temp file next to the cache, then renames it into place.
    async fn persist(&self, document: &CacheDocument) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec_pretty(document)?;
        let path = self.cache_path.clone();
        tokio::task::spawn_blocking(move || write_atomically(&path, &bytes)).await??;
        Ok(())
    }
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), CacheError> {
    let to_write_error = |source: std::io::Error| CacheError::Write {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent).map_err(to_write_error)?;

    let mut temp = tempfile::NamedTempFile::new_in(&parent).map_err(to_write_error)?;
    temp.write_all(bytes).map_err(to_write_error)?;
    temp.as_file().sync_all().map_err(to_write_error)?;
    temp.persist(path).map_err(|e| to_write_error(e.error))?;
    Ok(())
}
