//! Search API routes

use super::server::{json_error, load_document};
use super::state::{GuardedCacheStore, ServerState};
use crate::search::search as search_records;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct SearchQuery {
    keyword: Option<String>,
    /// Short alias for `keyword`.
    q: Option<String>,
}

async fn search(
    State(cache_store): State<GuardedCacheStore>,
    Query(query): Query<SearchQuery>,
) -> Response {
    let keyword = query.keyword.or(query.q).unwrap_or_default();
    if keyword.trim().is_empty() {
        return json_error(StatusCode::BAD_REQUEST, "Keyword is required");
    }

    let doc = match load_document(&cache_store).await {
        Ok(doc) => doc,
        Err(response) => return response,
    };

    match search_records(&doc, &keyword) {
        Ok(results) => Json(results).into_response(),
        Err(err) => json_error(StatusCode::BAD_REQUEST, &err.to_string()),
    }
}

pub fn make_search_routes(state: ServerState) -> Router {
    Router::new()
        .route("/search", get(search))
        .with_state(state)
}
