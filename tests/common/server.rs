//! Test server lifecycle management
//!
//! Each test gets an isolated server with its own manifests, cache file and
//! stub providers.

use super::constants::*;
use super::fixtures::create_test_manifests;
use super::stubs::StubProviders;
use missing_media_server::config::{
    AppConfig, CliConfig, EnrichmentConfig, FileConfig, OverseerrConfig, ProvidersConfig,
};
use missing_media_server::server::make_app;
use missing_media_server::{AppComponents, CacheStore, RequestsLoggingLevel};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
pub struct TestServerOptions {
    pub poster_caching: bool,
    pub overseerr: bool,
}

impl Default for TestServerOptions {
    fn default() -> Self {
        Self {
            poster_caching: false,
            overseerr: true,
        }
    }
}

/// Test server instance wired to local stub providers
///
/// When dropped, the server gracefully shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    pub stubs: StubProviders,
    pub cache_store: Arc<CacheStore>,
    pub cache_path: PathBuf,
    pub poster_dir: Option<PathBuf>,

    // Private fields - keep resources alive until drop
    _temp_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    pub async fn spawn() -> Self {
        Self::spawn_with(TestServerOptions::default()).await
    }

    /// Spawns a server on a random port, configured through the same
    /// [`AppConfig`] path as the binary.
    pub async fn spawn_with(options: TestServerOptions) -> Self {
        let stubs = StubProviders::spawn().await;
        let (temp_dir, manifests_dir) =
            create_test_manifests().expect("Failed to create test manifests");
        let cache_path = temp_dir.path().join("cache/cache.json");
        let poster_dir = options
            .poster_caching
            .then(|| temp_dir.path().join("posters"));

        let cli = CliConfig {
            manifests_dir: Some(manifests_dir),
            cache_path: Some(cache_path.clone()),
            host: "127.0.0.1".to_string(),
            port: 0,
            logging_level: RequestsLoggingLevel::None,
            content_cache_age_sec: 0, // Disable caching in tests
            poster_cache_dir: poster_dir.clone(),
            provider_timeout_sec: REQUEST_TIMEOUT_SECS,
            ..Default::default()
        };
        let file_config = FileConfig {
            providers: Some(ProvidersConfig {
                tmdb_api_key: Some(TMDB_API_KEY.to_string()),
                tvdb_api_key: Some(TVDB_API_KEY.to_string()),
                tmdb_base_url: Some(stubs.tmdb_base_url()),
                tmdb_image_base_url: Some(stubs.tmdb_image_base_url()),
                tvdb_base_url: Some(stubs.tvdb_base_url()),
                ..Default::default()
            }),
            enrichment: Some(EnrichmentConfig {
                delay_ms: Some(0),
                max_concurrent_lookups: Some(2),
            }),
            overseerr: options.overseerr.then(|| OverseerrConfig {
                url: Some(stubs.overseerr_url()),
                api_key: Some(OVERSEERR_API_KEY.to_string()),
            }),
            ..Default::default()
        };

        let config =
            AppConfig::resolve(&cli, Some(file_config)).expect("Failed to resolve test config");
        let components = AppComponents::build(&config).expect("Failed to build components");
        let cache_store = components.cache_store.clone();

        // Warm the cache like the binary does before listening
        cache_store
            .get_or_build()
            .await
            .expect("Failed to build cache");

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        let app = make_app(
            components.server_config,
            components.cache_store,
            components.requester,
        );

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            stubs,
            cache_store,
            cache_path,
            poster_dir,
            _temp_dir: temp_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the home endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
