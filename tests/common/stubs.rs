//! Local stand-ins for TMDb, TVDb and Overseerr
//!
//! One axum server hosts all three under different path prefixes and counts
//! every call so tests can assert on outbound traffic.

use super::constants::*;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// Tiny JPEG-ish payload served for poster downloads.
pub const POSTER_BYTES: &[u8] = b"\xFF\xD8\xFFposter";

#[derive(Default)]
pub struct StubCounters {
    pub tmdb_lookups: AtomicUsize,
    pub tvdb_logins: AtomicUsize,
    pub tvdb_lookups: AtomicUsize,
    pub poster_downloads: AtomicUsize,
    pub overseerr_requests: Mutex<Vec<Value>>,
}

#[derive(Clone)]
struct StubState {
    base_url: String,
    counters: Arc<StubCounters>,
}

pub struct StubProviders {
    pub base_url: String,
    pub counters: Arc<StubCounters>,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl StubProviders {
    pub async fn spawn() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub providers");
        let port = listener.local_addr().expect("No local address").port();
        let base_url = format!("http://127.0.0.1:{}", port);
        let counters = Arc::new(StubCounters::default());

        let state = StubState {
            base_url: base_url.clone(),
            counters: counters.clone(),
        };
        let app = Router::new()
            .route("/tmdb/3/movie/{id}", get(tmdb_movie))
            .route("/tvdb/v4/login", post(tvdb_login))
            .route("/tvdb/v4/series/{id}", get(tvdb_series))
            .route("/overseerr/api/v1/request", post(overseerr_request))
            .route("/posters/{file}", get(poster))
            .with_state(state);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Stub providers failed");
        });

        Self {
            base_url,
            counters,
            _shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn tmdb_base_url(&self) -> String {
        format!("{}/tmdb/3", self.base_url)
    }

    pub fn tmdb_image_base_url(&self) -> String {
        format!("{}/posters", self.base_url)
    }

    pub fn tvdb_base_url(&self) -> String {
        format!("{}/tvdb/v4", self.base_url)
    }

    pub fn overseerr_url(&self) -> String {
        format!("{}/overseerr", self.base_url)
    }

    pub fn tmdb_lookups(&self) -> usize {
        self.counters.tmdb_lookups.load(Ordering::SeqCst)
    }

    pub fn tvdb_lookups(&self) -> usize {
        self.counters.tvdb_lookups.load(Ordering::SeqCst)
    }

    pub fn overseerr_requests(&self) -> Vec<Value> {
        self.counters.overseerr_requests.lock().unwrap().clone()
    }
}

impl Drop for StubProviders {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn tmdb_movie(
    State(state): State<StubState>,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.counters.tmdb_lookups.fetch_add(1, Ordering::SeqCst);

    if query.get("api_key").map(String::as_str) != Some(TMDB_API_KEY) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    match id.as_str() {
        ALIEN3_ID => Json(json!({
            "id": 8077,
            "title": "Alien³",
            "poster_path": "/alien3.jpg",
            "overview": "After escaping with Newt and Hicks...",
            "release_date": "1992-05-22"
        }))
        .into_response(),
        ALIEN_RESURRECTION_ID => Json(json!({
            "id": 8078,
            "title": "Alien Resurrection",
            "poster_path": null,
            "overview": "Two hundred years after Lt. Ripley died...",
            "release_date": "1997-11-12"
        }))
        .into_response(),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({"status_code": 34, "status_message": "Not found"})),
        )
            .into_response(),
    }
}

async fn tvdb_login(State(state): State<StubState>, Json(body): Json<Value>) -> Response {
    state.counters.tvdb_logins.fetch_add(1, Ordering::SeqCst);

    if body["apikey"] != TVDB_API_KEY {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!({"status": "success", "data": {"token": TVDB_TOKEN}})).into_response()
}

async fn tvdb_series(
    State(state): State<StubState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    state.counters.tvdb_lookups.fetch_add(1, Ordering::SeqCst);

    let expected = format!("Bearer {}", TVDB_TOKEN);
    if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some(expected.as_str()) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    match id.as_str() {
        STAR_TREK_CONTINUES_ID => Json(json!({
            "status": "success",
            "data": {
                "id": 253463,
                "name": "Star Trek Continues",
                "image": format!("{}/posters/253463.jpg", state.base_url),
                "firstAired": "2013-05-24",
                "overview": "The continuing voyages of the starship Enterprise."
            }
        }))
        .into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn overseerr_request(
    State(state): State<StubState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if headers.get("x-api-key").and_then(|v| v.to_str().ok()) != Some(OVERSEERR_API_KEY) {
        return StatusCode::FORBIDDEN.into_response();
    }

    state
        .counters
        .overseerr_requests
        .lock()
        .unwrap()
        .push(body.clone());

    if body["mediaId"] == OVERSEERR_FAILING_ID {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"message": "Something went wrong"})),
        )
            .into_response();
    }

    (
        StatusCode::CREATED,
        Json(json!({
            "id": 1,
            "status": 1,
            "media": {"tmdbId": body["mediaId"], "mediaType": body["mediaType"]}
        })),
    )
        .into_response()
}

async fn poster(State(state): State<StubState>, Path(_file): Path<String>) -> impl IntoResponse {
    state.counters.poster_downloads.fetch_add(1, Ordering::SeqCst);
    ([("content-type", "image/jpeg")], POSTER_BYTES)
}
