//! Pass-scoped grouping state.

use crate::catalog::{CacheDocument, MediaDetails, MediaKind, MediaRecord};
use indexmap::map::Entry;
use indexmap::IndexMap;

/// Outcome of registering a manifest entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// First time this id is seen in the pass; it needs enrichment.
    New,
    /// Known id, the collection was appended to its record.
    Merged,
    /// Known id already listing this collection.
    AlreadyListed,
}

/// The movie and show mappings being built by one ingestion pass.
///
/// Owned by a single pass, so [`register`](Self::register) is an atomic
/// insert-or-get for a `(kind, id)` key.
#[derive(Debug, Default)]
pub struct PassAccumulator {
    movies: IndexMap<String, MediaRecord>,
    shows: IndexMap<String, MediaRecord>,
}

impl PassAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    fn mapping_mut(&mut self, kind: MediaKind) -> &mut IndexMap<String, MediaRecord> {
        match kind {
            MediaKind::Movie => &mut self.movies,
            MediaKind::Show => &mut self.shows,
        }
    }

    /// Records that `collection` lists `id` as missing. The first title seen
    /// for an id is kept.
    pub fn register(&mut self, kind: MediaKind, id: &str, title: &str, collection: &str) -> Registration {
        match self.mapping_mut(kind).entry(id.to_string()) {
            Entry::Occupied(mut entry) => {
                if entry.get_mut().add_collection(collection) {
                    Registration::Merged
                } else {
                    Registration::AlreadyListed
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(MediaRecord::new(kind, id, title, collection));
                Registration::New
            }
        }
    }

    pub fn attach_details(&mut self, kind: MediaKind, id: &str, details: Option<MediaDetails>) {
        if let Some(record) = self.mapping_mut(kind).get_mut(id) {
            record.details = details;
        }
    }

    pub fn len(&self, kind: MediaKind) -> usize {
        match kind {
            MediaKind::Movie => self.movies.len(),
            MediaKind::Show => self.shows.len(),
        }
    }

    pub fn into_document(self) -> CacheDocument {
        CacheDocument {
            movies: self.movies,
            shows: self.shows,
        }
    }
}
