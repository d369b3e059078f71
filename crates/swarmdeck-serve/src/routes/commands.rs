// ABOUTME: Command queue handlers for the desktop consumer.
// ABOUTME: fetch-command peeks, ack-command removes by id, queue-command enqueues over HTTP.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
struct AckRequest {
    id: String,
}

#[derive(Debug, Deserialize)]
struct QueueRequest {
    #[serde(default)]
    text: String,
}

pub async fn fetch(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Json<Value>> {
    state.authorize_commands(&headers)?;
    Ok(Json(json!({ "command": state.panel.commands().peek() })))
}

pub async fn ack(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    state.authorize_commands(&headers)?;
    let request: AckRequest = serde_json::from_slice(&body)?;
    let id = Uuid::parse_str(request.id.trim())
        .map_err(|_| ApiError::invalid(format!("invalid command id: {}", request.id)))?;
    let removed = state.panel.commands().ack(id);
    Ok(Json(json!({ "success": true, "removed": removed })))
}

pub async fn queue(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    state.authorize_commands(&headers)?;
    let request: QueueRequest = serde_json::from_slice(&body)?;
    let command = state
        .panel
        .commands()
        .enqueue(&request.text)
        .ok_or_else(|| ApiError::invalid("text is required"))?;
    Ok(Json(json!({ "success": true, "command": command })))
}
