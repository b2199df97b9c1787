use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use crate::cache_store::CacheStore;
use crate::catalog::CacheDocument;
use crate::fulfillment::MediaRequester;
use crate::providers::POSTERS_URL_PREFIX;
use tower_http::services::ServeDir;

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;

#[cfg(feature = "slowdown")]
use super::slowdown_request;
use super::{
    http_cache, log_requests, make_media_routes, make_request_routes, make_search_routes,
    state::*, ServerConfig,
};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub cached: bool,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

/// `{"error": message}` with the given status.
pub(super) fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(ErrorBody { error: message })).into_response()
}

/// Loads the cached document, building it on a miss. Failures are logged and
/// turned into a generic 500.
pub(super) async fn load_document(cache_store: &CacheStore) -> Result<CacheDocument, Response> {
    cache_store.get_or_build().await.map_err(|err| {
        error!("Failed to load cache: {}", err);
        json_error(StatusCode::INTERNAL_SERVER_ERROR, "Processing error")
    })
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        cached: tokio::fs::try_exists(state.cache_store.cache_path())
            .await
            .unwrap_or(false),
    };
    Json(stats)
}

pub fn make_app(
    config: ServerConfig,
    cache_store: Arc<CacheStore>,
    requester: Option<Arc<dyn MediaRequester>>,
) -> Router {
    let state = ServerState::new(config.clone(), cache_store, requester);

    let api_routes: Router = Router::new()
        .merge(make_media_routes(state.clone()))
        .merge(make_search_routes(state.clone()))
        .merge(make_request_routes(state.clone()));

    let home_router: Router = match config.frontend_dir_path {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new()
            .route("/", get(home))
            .with_state(state.clone()),
    };

    let mut app: Router = home_router.nest("/api", api_routes);

    if let Some(poster_dir) = config.poster_cache_dir {
        let poster_routes: Router = Router::new()
            .nest_service(POSTERS_URL_PREFIX, ServeDir::new(poster_dir))
            .layer(middleware::from_fn_with_state(
                config.content_cache_age_sec,
                http_cache,
            ));
        app = app.merge(poster_routes);
    }

    #[cfg(feature = "slowdown")]
    {
        app = app.layer(middleware::from_fn(slowdown_request));
    }
    app = app.layer(middleware::from_fn_with_state(state, log_requests));

    app
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Shutting down...");
}

pub async fn run_server(
    config: ServerConfig,
    cache_store: Arc<CacheStore>,
    requester: Option<Arc<dyn MediaRequester>>,
) -> Result<()> {
    let address = format!("{}:{}", config.host, config.port);
    let app = make_app(config, cache_store, requester);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("Listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
