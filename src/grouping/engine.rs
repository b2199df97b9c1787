//! Folds decoded manifests into the movie and show mappings, enriching each
//! new id through its provider.

use super::accumulator::{PassAccumulator, Registration};
use super::pacer::LookupPacer;
use crate::catalog::{CacheDocument, MediaDetails, MediaKind};
use crate::manifest::{ManifestDocument, MissingEntry};
use crate::providers::MetadataProvider;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Lookup pacing for an ingestion pass.
#[derive(Debug, Clone)]
pub struct EnrichmentSettings {
    /// Minimum spacing between the starts of two new-id lookups.
    pub delay: Duration,
    /// Cap on lookups in flight at once. Values below 1 are treated as 1.
    pub max_concurrent_lookups: usize,
}

impl Default for EnrichmentSettings {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(1000),
            max_concurrent_lookups: 5,
        }
    }
}

/// Counters for one ingestion pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    pub manifests: usize,
    pub collections: usize,
    pub movies: usize,
    pub shows: usize,
    pub lookups: usize,
    pub lookup_failures: usize,
    /// Entries whose id was already known and gained a new collection.
    pub merged: usize,
}

struct PendingLookup {
    kind: MediaKind,
    id: String,
    handle: JoinHandle<Option<MediaDetails>>,
}

pub struct GroupingEngine {
    movie_provider: Arc<dyn MetadataProvider>,
    show_provider: Arc<dyn MetadataProvider>,
    settings: EnrichmentSettings,
}

impl GroupingEngine {
    pub fn new(
        movie_provider: Arc<dyn MetadataProvider>,
        show_provider: Arc<dyn MetadataProvider>,
        settings: EnrichmentSettings,
    ) -> Self {
        Self {
            movie_provider,
            show_provider,
            settings,
        }
    }

    pub fn settings(&self) -> &EnrichmentSettings {
        &self.settings
    }

    fn provider(&self, kind: MediaKind) -> &Arc<dyn MetadataProvider> {
        match kind {
            MediaKind::Movie => &self.movie_provider,
            MediaKind::Show => &self.show_provider,
        }
    }

    /// Runs one pass over `documents`, in the order given.
    ///
    /// Every new `(kind, id)` gets exactly one provider lookup. Lookup starts
    /// are paced by the configured delay and may overlap; the pass waits for
    /// all of them before returning. A failed lookup leaves `details` empty.
    pub async fn group(&self, documents: &[ManifestDocument]) -> (CacheDocument, PassReport) {
        let mut acc = PassAccumulator::new();
        let mut pacer = LookupPacer::new(self.settings.delay);
        let permits = Arc::new(Semaphore::new(self.settings.max_concurrent_lookups.max(1)));
        let mut pending: Vec<PendingLookup> = Vec::new();
        let mut report = PassReport {
            manifests: documents.len(),
            ..Default::default()
        };

        for document in documents {
            debug!("Grouping manifest {}", document.file_name);
            for (collection, body) in &document.collections {
                report.collections += 1;
                let sections: [(MediaKind, &Option<Vec<MissingEntry>>); 2] = [
                    (MediaKind::Movie, &body.movies_missing),
                    (MediaKind::Show, &body.shows_missing),
                ];

                for (kind, entries) in sections {
                    for entry in entries.iter().flatten() {
                        match acc.register(kind, &entry.id, &entry.title, collection) {
                            Registration::New => {
                                let permit = Arc::clone(&permits).acquire_owned().await.ok();
                                pacer.wait_turn().await;

                                let provider = Arc::clone(self.provider(kind));
                                let id = entry.id.clone();
                                let handle = tokio::spawn(async move {
                                    let _permit = permit;
                                    provider.lookup(&id).await
                                });
                                pending.push(PendingLookup {
                                    kind,
                                    id: entry.id.clone(),
                                    handle,
                                });
                            }
                            Registration::Merged => report.merged += 1,
                            Registration::AlreadyListed => {}
                        }
                    }
                }
            }
        }

        let (keys, handles): (Vec<_>, Vec<_>) = pending
            .into_iter()
            .map(|lookup| ((lookup.kind, lookup.id), lookup.handle))
            .unzip();
        let outcomes = join_all(handles).await;

        for ((kind, id), outcome) in keys.into_iter().zip(outcomes) {
            let details = match outcome {
                Ok(details) => details,
                Err(err) => {
                    warn!("Lookup task for {} {} failed: {}", kind, id, err);
                    None
                }
            };
            report.lookups += 1;
            if details.is_none() {
                report.lookup_failures += 1;
            }
            acc.attach_details(kind, &id, details);
        }

        report.movies = acc.len(MediaKind::Movie);
        report.shows = acc.len(MediaKind::Show);
        info!(
            "Grouped {} manifests ({} collections): {} movies, {} shows, {} lookups ({} failed), {} merged",
            report.manifests,
            report.collections,
            report.movies,
            report.shows,
            report.lookups,
            report.lookup_failures,
            report.merged
        );

        (acc.into_document(), report)
    }
}
