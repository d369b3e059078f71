// ABOUTME: Start, stop, status and health handlers.
// ABOUTME: Thin JSON wrappers over the Panel's slot and worker operations.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use swarmdeck_core::{PanelStatus, MAX_SLOTS};
use tracing::info;

/// Body of `POST /start` and `POST /stop`. Older clients send `userId` or a
/// `categories` array instead of `category`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRequest {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
}

impl CategoryRequest {
    /// Parse a possibly empty JSON body.
    pub fn parse(body: &[u8]) -> ApiResult<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        Ok(serde_json::from_slice(body)?)
    }

    /// First non-blank identifier across the accepted field names.
    pub fn category(&self) -> Option<&str> {
        self.category
            .as_deref()
            .into_iter()
            .chain(self.user_id.as_deref())
            .chain(self.categories.first().map(String::as_str))
            .map(str::trim)
            .find(|s| !s.is_empty())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartResponse {
    pub success: bool,
    pub message: String,
    pub categories: Vec<String>,
    pub slots_used: usize,
    pub slots_max: usize,
}

pub async fn start(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<StartResponse>> {
    let request = CategoryRequest::parse(&body)?;
    let category = request
        .category()
        .ok_or_else(|| ApiError::invalid("category is required"))?
        .to_string();

    let categories = state.panel.start(&category).await?;
    info!(category = %category, slots = categories.len(), "Started category over HTTP");

    Ok(Json(StartResponse {
        success: true,
        message: format!("Started category {}", category),
        slots_used: categories.len(),
        slots_max: MAX_SLOTS,
        categories,
    }))
}

pub async fn stop(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<Value>> {
    let request = CategoryRequest::parse(&body)?;
    let outcome = state.panel.stop(request.category()).await;
    Ok(Json(json!({
        "success": true,
        "stopped": outcome.stopped,
        "message": outcome.message,
        "categories": outcome.categories,
    })))
}

pub async fn status(State(state): State<AppState>) -> Json<PanelStatus> {
    Json(state.panel.status())
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
    }))
}
