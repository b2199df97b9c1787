//! Collection manifest decoding.
//!
//! A manifest is a YAML document whose top-level keys are collection names.
//! Each collection may declare the titles it is missing under two
//! well-known keys, each a mapping from external id to title:
//!
//! ```yaml
//! Alien Collection:
//!   Movies Missing (TMDb IDs):
//!     8077: Alien³
//!     8078: Alien Resurrection
//! Star Trek:
//!   Shows Missing (TVDb IDs):
//!     253463: Star Trek Continues
//! ```

use serde_yaml::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

pub const MOVIES_MISSING_KEY: &str = "Movies Missing (TMDb IDs)";
pub const SHOWS_MISSING_KEY: &str = "Shows Missing (TVDb IDs)";

/// Extensions recognized as manifest files.
pub const MANIFEST_EXTENSIONS: &[&str] = &["yml", "yaml"];

#[derive(Debug, Error)]
pub enum ManifestDecodeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML: {0}")]
    Syntax(#[from] serde_yaml::Error),

    #[error("Top-level document is not a mapping")]
    NotAMapping,
}

/// A missing title declared by a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingEntry {
    pub id: String,
    pub title: String,
}

/// The missing-title lists of one collection. `None` means the key was absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionBody {
    pub movies_missing: Option<Vec<MissingEntry>>,
    pub shows_missing: Option<Vec<MissingEntry>>,
}

/// One decoded manifest file, collections in declared order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestDocument {
    pub file_name: String,
    pub collections: Vec<(String, CollectionBody)>,
}

/// Result of scanning a manifest directory.
#[derive(Debug, Default)]
pub struct ManifestScan {
    pub documents: Vec<ManifestDocument>,
    pub skipped: Vec<(PathBuf, ManifestDecodeError)>,
}

/// Scalar keys and titles may be written unquoted, so numbers are accepted
/// and read back in their decimal form.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn decode_entries(collection: &str, key: &str, value: &Value) -> Option<Vec<MissingEntry>> {
    let Value::Mapping(items) = value else {
        debug!("Ignoring non-mapping \"{}\" in collection {}", key, collection);
        return None;
    };

    let mut entries = Vec::with_capacity(items.len());
    for (raw_id, raw_title) in items {
        let id = scalar_to_string(raw_id).unwrap_or_default();
        let title = scalar_to_string(raw_title).unwrap_or_default();
        if id.trim().is_empty() || title.trim().is_empty() {
            debug!(
                "Dropping invalid entry {:?}: {:?} in collection {}",
                raw_id, raw_title, collection
            );
            continue;
        }
        entries.push(MissingEntry { id, title });
    }
    Some(entries)
}

fn decode_collection(name: &str, body: &Value) -> Option<CollectionBody> {
    let Value::Mapping(fields) = body else {
        debug!("Ignoring collection {} without a mapping body", name);
        return None;
    };

    Some(CollectionBody {
        movies_missing: fields
            .get(MOVIES_MISSING_KEY)
            .and_then(|v| decode_entries(name, MOVIES_MISSING_KEY, v)),
        shows_missing: fields
            .get(SHOWS_MISSING_KEY)
            .and_then(|v| decode_entries(name, SHOWS_MISSING_KEY, v)),
    })
}

/// Decodes the text of one manifest file.
///
/// An empty file decodes to a manifest with no collections.
pub fn decode_manifest(file_name: &str, text: &str) -> Result<ManifestDocument, ManifestDecodeError> {
    let root: Value = if text.trim().is_empty() {
        Value::Null
    } else {
        serde_yaml::from_str(text)?
    };

    let collections = match root {
        Value::Null => Vec::new(),
        Value::Mapping(mapping) => mapping
            .iter()
            .filter_map(|(key, body)| {
                let name = scalar_to_string(key)?;
                decode_collection(&name, body).map(|body| (name, body))
            })
            .collect(),
        _ => return Err(ManifestDecodeError::NotAMapping),
    };

    Ok(ManifestDocument {
        file_name: file_name.to_string(),
        collections,
    })
}

fn is_manifest_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| MANIFEST_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Lists manifest files directly inside `dir`, sorted by file name.
pub fn list_manifest_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_file() && is_manifest_file(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Reads and decodes every manifest in `dir`.
///
/// Files that fail to decode are logged and reported in
/// [`ManifestScan::skipped`]; they never abort the scan.
pub async fn parse_manifest_dir(dir: &Path) -> ManifestScan {
    let listing_dir = dir.to_path_buf();
    let files = match tokio::task::spawn_blocking(move || list_manifest_files(&listing_dir)).await
    {
        Ok(Ok(files)) => files,
        Ok(Err(err)) => {
            warn!("Could not list manifest directory {:?}: {}", dir, err);
            return ManifestScan::default();
        }
        Err(err) => {
            warn!("Manifest listing task failed for {:?}: {}", dir, err);
            return ManifestScan::default();
        }
    };

    let mut scan = ManifestScan::default();
    for path in files {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let decoded = match tokio::fs::read_to_string(&path).await {
            Ok(text) => decode_manifest(&file_name, &text),
            Err(err) => Err(ManifestDecodeError::from(err)),
        };

        match decoded {
            Ok(document) => {
                info!(
                    "Parsed manifest {} ({} collections)",
                    file_name,
                    document.collections.len()
                );
                scan.documents.push(document);
            }
            Err(err) => {
                warn!("Skipping manifest {}: {}", file_name, err);
                scan.skipped.push((path, err));
            }
        }
    }

    scan
}
