//! Handler for `POST /api/recommend`.
//!
//! The client only ever sees the fixed messages below; upstream error bodies
//! and exception detail stay in the server logs.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::AppState;
use crate::llm::ProviderError;

// Client-visible messages — part of the API contract, do not reword.
const MSG_METHOD_NOT_ALLOWED: &str = "Method Not Allowed";
const MSG_MISSING_QUERY: &str = "Search query is required.";
const MSG_KEY_NOT_CONFIGURED: &str = "API key is not configured on the server.";
const MSG_UPSTREAM_FAILED: &str = "Failed to get a response from the AI model.";
const MSG_INTERNAL: &str = "An internal server error occurred.";

// ── Request types ─────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
struct RecommendRequest {
    #[serde(default)]
    query: Option<String>,
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Build a JSON error response body.
fn json_error(msg: &str) -> Json<serde_json::Value> {
    Json(json!({ "error": msg }))
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// Router-level fallback for wrong verbs on a known route.
pub(super) async fn method_not_allowed() -> Response {
    (StatusCode::METHOD_NOT_ALLOWED, json_error(MSG_METHOD_NOT_ALLOWED)).into_response()
}

/// POST /api/recommend
pub(super) async fn recommend(State(state): State<AppState>, body: String) -> Response {
    // The body is parsed by hand so that a non-JSON body, a non-string
    // `query` and a missing `query` all map to the same 400.
    let query = serde_json::from_str::<RecommendRequest>(&body)
        .ok()
        .and_then(|r| r.query)
        .filter(|q| !q.is_empty());

    let Some(query) = query else {
        return (StatusCode::BAD_REQUEST, json_error(MSG_MISSING_QUERY)).into_response();
    };

    // Checked before any outbound work so misconfiguration fails fast with a
    // diagnosable message instead of an opaque upstream 4xx.
    let Some(api_key) = state.api_key.as_deref() else {
        error!("GEMINI_API_KEY is not configured — rejecting request");
        return (StatusCode::INTERNAL_SERVER_ERROR, json_error(MSG_KEY_NOT_CONFIGURED)).into_response();
    };

    match state.provider.recommend(api_key, &query).await {
        Ok(rec) => (StatusCode::OK, Json(rec)).into_response(),
        Err(ProviderError::Upstream { status }) => {
            // Upstream detail was already logged at the provider; the client
            // gets the mirrored status and a fixed message.
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            (status, json_error(MSG_UPSTREAM_FAILED)).into_response()
        }
        Err(e @ (ProviderError::Transport(_) | ProviderError::MalformedReply(_))) => {
            error!(error = %e, "recommendation request failed");
            (StatusCode::INTERNAL_SERVER_ERROR, json_error(MSG_INTERNAL)).into_response()
        }
    }
}
