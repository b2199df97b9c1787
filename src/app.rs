//! Wiring from a resolved [`AppConfig`] to the server's collaborators.

use crate::cache_store::CacheStore;
use crate::catalog::MediaKind;
use crate::config::AppConfig;
use crate::fulfillment::{MediaRequester, OverseerrClient};
use crate::grouping::GroupingEngine;
use crate::providers::{MetadataProvider, PosterCache, PosterCachingProvider, TmdbClient, TvdbClient};
use crate::server::ServerConfig;
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

pub struct AppComponents {
    pub server_config: ServerConfig,
    pub cache_store: Arc<CacheStore>,
    pub requester: Option<Arc<dyn MediaRequester>>,
}

impl AppComponents {
    pub fn build(config: &AppConfig) -> Result<Self> {
        let providers = &config.providers;

        let mut movie_provider: Arc<dyn MetadataProvider> = Arc::new(
            TmdbClient::new(
                &providers.tmdb_api_key,
                &providers.tmdb_base_url,
                providers.timeout_sec,
            )?
            .with_image_base_url(&providers.tmdb_image_base_url),
        );
        let mut show_provider: Arc<dyn MetadataProvider> = Arc::new(TvdbClient::new(
            &providers.tvdb_api_key,
            providers.tvdb_pin.as_deref(),
            &providers.tvdb_base_url,
            providers.timeout_sec,
        )?);

        if let Some(dir) = &config.poster_cache_dir {
            let posters = Arc::new(PosterCache::new(dir, providers.timeout_sec)?);
            info!("Caching posters in {:?}", posters.dir());
            movie_provider = Arc::new(PosterCachingProvider::new(
                movie_provider,
                MediaKind::Movie,
                posters.clone(),
            ));
            show_provider = Arc::new(PosterCachingProvider::new(
                show_provider,
                MediaKind::Show,
                posters,
            ));
        }

        let engine = Arc::new(GroupingEngine::new(
            movie_provider,
            show_provider,
            config.enrichment.clone(),
        ));
        info!(
            "Lookups paced at {:?}, at most {} in flight",
            engine.settings().delay,
            engine.settings().max_concurrent_lookups
        );
        let cache_store = Arc::new(CacheStore::new(
            &config.cache_path,
            &config.manifests_dir,
            engine,
        ));
        info!(
            "Cache at {:?}, manifests from {:?}",
            cache_store.cache_path(),
            cache_store.manifests_dir()
        );

        let requester: Option<Arc<dyn MediaRequester>> = match &config.overseerr {
            Some(overseerr) => {
                info!("Overseerr configured at {}", overseerr.url);
                let client =
                    OverseerrClient::new(&overseerr.url, &overseerr.api_key, providers.timeout_sec)?;
                Some(Arc::new(client) as Arc<dyn MediaRequester>)
            }
            None => None,
        };

        let server_config = ServerConfig {
            requests_logging_level: config.logging_level.clone(),
            host: config.host.clone(),
            port: config.port,
            content_cache_age_sec: config.content_cache_age_sec,
            frontend_dir_path: config.frontend_dir_path.clone(),
            poster_cache_dir: config.poster_cache_dir.clone(),
        };

        Ok(Self {
            server_config,
            cache_store,
            requester,
        })
    }
}
