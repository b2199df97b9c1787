use axum::extract::FromRef;

use crate::cache_store::CacheStore;
use crate::fulfillment::MediaRequester;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedCacheStore = Arc<CacheStore>;
pub type OptionalRequester = Option<Arc<dyn MediaRequester>>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub cache_store: GuardedCacheStore,
    pub requester: OptionalRequester,
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        cache_store: GuardedCacheStore,
        requester: OptionalRequester,
    ) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            cache_store,
            requester,
        }
    }
}

impl FromRef<ServerState> for GuardedCacheStore {
    fn from_ref(input: &ServerState) -> Self {
        input.cache_store.clone()
    }
}

impl FromRef<ServerState> for OptionalRequester {
    fn from_ref(input: &ServerState) -> Self {
        input.requester.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
