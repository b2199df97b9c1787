//! Listing routes over the cached document.

use super::pagination::PaginationQuery;
use super::server::{json_error, load_document};
use super::state::{GuardedCacheStore, ServerState};
use crate::catalog::{MediaKind, MediaRecord};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

async fn get_collections(State(cache_store): State<GuardedCacheStore>) -> Response {
    match load_document(&cache_store).await {
        Ok(doc) => Json(doc).into_response(),
        Err(response) => response,
    }
}

async fn list_kind(
    cache_store: &GuardedCacheStore,
    kind: MediaKind,
    pagination: PaginationQuery,
) -> Response {
    let request = match pagination.validate() {
        Ok(r) => r,
        Err(message) => return json_error(StatusCode::BAD_REQUEST, &message),
    };
    let doc = match load_document(cache_store).await {
        Ok(doc) => doc,
        Err(response) => return response,
    };

    let records: Vec<MediaRecord> = doc.mapping(kind).values().cloned().collect();
    Json(request.paginate(records)).into_response()
}

async fn get_movies(
    State(cache_store): State<GuardedCacheStore>,
    Query(pagination): Query<PaginationQuery>,
) -> Response {
    list_kind(&cache_store, MediaKind::Movie, pagination).await
}

async fn get_shows(
    State(cache_store): State<GuardedCacheStore>,
    Query(pagination): Query<PaginationQuery>,
) -> Response {
    list_kind(&cache_store, MediaKind::Show, pagination).await
}

async fn get_categories(
    State(cache_store): State<GuardedCacheStore>,
    Query(pagination): Query<PaginationQuery>,
) -> Response {
    let request = match pagination.validate() {
        Ok(r) => r,
        Err(message) => return json_error(StatusCode::BAD_REQUEST, &message),
    };
    match load_document(&cache_store).await {
        Ok(doc) => Json(request.paginate(doc.collection_names())).into_response(),
        Err(response) => response,
    }
}

async fn get_category(
    State(cache_store): State<GuardedCacheStore>,
    Path(name): Path<String>,
    Query(pagination): Query<PaginationQuery>,
) -> Response {
    let request = match pagination.validate() {
        Ok(r) => r,
        Err(message) => return json_error(StatusCode::BAD_REQUEST, &message),
    };
    let doc = match load_document(&cache_store).await {
        Ok(doc) => doc,
        Err(response) => return response,
    };

    let records: Vec<MediaRecord> = doc.records_in_collection(&name).cloned().collect();
    if records.is_empty() {
        return json_error(
            StatusCode::NOT_FOUND,
            &format!("Category {:?} not found", name),
        );
    }
    Json(request.paginate(records)).into_response()
}

pub fn make_media_routes(state: ServerState) -> Router {
    Router::new()
        .route("/collections", get(get_collections))
        .route("/movies", get(get_movies))
        .route("/shows", get(get_shows))
        .route("/categories", get(get_categories))
        .route("/categories/{name}", get(get_category))
        .with_state(state)
}
