//! Forwarding "please add this title" requests to the fulfillment service.

use super::state::{OptionalRequester, ServerState};
use crate::catalog::MediaKind;
use crate::fulfillment::RequestError;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::error;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RequestMediaBody {
    /// Clients send the id either as a JSON number or a string.
    #[serde(default)]
    media_id: Option<serde_json::Value>,
    #[serde(default)]
    media_type: Option<String>,
}

#[derive(Debug, Serialize)]
struct RequestMediaResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<serde_json::Value>,
}

fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(RequestMediaResponse {
            success: false,
            message: Some(message.into()),
            data: None,
        }),
    )
        .into_response()
}

fn media_id_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

async fn request_media(
    State(requester): State<OptionalRequester>,
    Json(body): Json<RequestMediaBody>,
) -> Response {
    let (Some(media_id), Some(media_type)) = (
        body.media_id.as_ref().and_then(media_id_string),
        body.media_type.filter(|t| !t.trim().is_empty()),
    ) else {
        return failure(
            StatusCode::BAD_REQUEST,
            "Media ID and media type are required.",
        );
    };

    let Some(kind) = MediaKind::parse(media_type.trim()) else {
        return failure(
            StatusCode::BAD_REQUEST,
            format!("Unknown media type {:?}", media_type),
        );
    };

    let Some(requester) = requester else {
        return failure(
            StatusCode::SERVICE_UNAVAILABLE,
            "Requests are not configured on this server.",
        );
    };

    match requester.request_media(&media_id, kind).await {
        Ok(data) => Json(RequestMediaResponse {
            success: true,
            message: None,
            data: Some(data),
        })
        .into_response(),
        Err(err @ RequestError::InvalidMediaId(_)) => {
            failure(StatusCode::BAD_REQUEST, err.to_string())
        }
        Err(err) => {
            error!("Requesting {} {} failed: {}", kind, media_id, err);
            failure(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

pub fn make_request_routes(state: ServerState) -> Router {
    Router::new()
        .route("/request", post(request_media))
        .with_state(state)
}
