//! Cache document models.
//!
//! These are the types persisted as the JSON cache and served over HTTP.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// =============================================================================
// Enumerations
// =============================================================================

/// Kind of a missing title. Set when the record is created, never inferred
/// from which provider payload happens to be present.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Show,
}

impl MediaKind {
    /// Parse the media type names accepted at the HTTP boundary.
    /// Overseerr's `tv` is accepted as an alias for `show`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "movie" => Some(MediaKind::Movie),
            "show" | "tv" => Some(MediaKind::Show),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Show => "show",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Records
// =============================================================================

/// Normalized enrichment payload returned by a metadata provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MediaDetails {
    /// Poster field exactly as the provider returned it.
    pub poster: Option<String>,
    /// Absolute URL of the poster image.
    pub poster_url: Option<String>,
    pub overview: Option<String>,
    pub release_date: Option<String>,
    /// Local path under `/images` when poster caching is enabled.
    #[serde(default)]
    pub cached_poster: Option<String>,
    /// The provider's full response payload.
    pub raw: serde_json::Value,
}

/// A deduplicated missing title.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MediaRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub title: String,
    pub collections: Vec<String>,
    pub details: Option<MediaDetails>,
}

impl MediaRecord {
    pub fn new(kind: MediaKind, id: &str, title: &str, collection: &str) -> Self {
        Self {
            id: id.to_string(),
            kind,
            title: title.to_string(),
            collections: vec![collection.to_string()],
            details: None,
        }
    }

    /// Adds `collection` unless already listed. Returns true if it was added.
    pub fn add_collection(&mut self, collection: &str) -> bool {
        if self.collections.iter().any(|c| c == collection) {
            return false;
        }
        self.collections.push(collection.to_string());
        true
    }

    pub fn in_collection(&self, collection: &str) -> bool {
        self.collections.iter().any(|c| c == collection)
    }
}

// =============================================================================
// Cache document
// =============================================================================

/// The grouped and enriched result of one ingestion pass.
///
/// Both mappings keep insertion order, which is the order in which ids were
/// first seen while walking the manifests.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheDocument {
    pub movies: IndexMap<String, MediaRecord>,
    pub shows: IndexMap<String, MediaRecord>,
}

impl CacheDocument {
    pub fn mapping(&self, kind: MediaKind) -> &IndexMap<String, MediaRecord> {
        match kind {
            MediaKind::Movie => &self.movies,
            MediaKind::Show => &self.shows,
        }
    }

    /// All records, movies first, each mapping in insertion order.
    pub fn records(&self) -> impl Iterator<Item = &MediaRecord> {
        self.movies.values().chain(self.shows.values())
    }

    pub fn len(&self) -> usize {
        self.movies.len() + self.shows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty() && self.shows.is_empty()
    }

    /// Sorted, distinct collection names referenced by any record.
    pub fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .records()
            .flat_map(|r| r.collections.iter().cloned())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Records referenced by `collection`, movies first.
    pub fn records_in_collection<'a>(
        &'a self,
        collection: &'a str,
    ) -> impl Iterator<Item = &'a MediaRecord> + 'a {
        self.records().filter(move |r| r.in_collection(collection))
    }
}
