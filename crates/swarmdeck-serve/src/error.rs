// ABOUTME: HTTP error type for the control surface.
// ABOUTME: Maps PanelError onto status codes and a { success: false, error } body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use swarmdeck_core::PanelError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Panel(#[from] PanelError),

    #[error("Invalid request body: {0}")]
    Body(#[from] serde_json::Error),
}

impl ApiError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ApiError::Panel(PanelError::InvalidRequest(message.into()))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Panel(e) => match e {
                PanelError::InvalidRequest(_) | PanelError::CapacityExceeded { .. } => {
                    StatusCode::BAD_REQUEST
                }
                PanelError::AlreadyActive(_) => StatusCode::CONFLICT,
                PanelError::Offline => StatusCode::SERVICE_UNAVAILABLE,
                PanelError::Unauthorized => StatusCode::UNAUTHORIZED,
                PanelError::Configuration(_)
                | PanelError::Launch(_)
                | PanelError::Rules { .. }
                | PanelError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Body(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }
        (status, Json(json!({ "success": false, "error": self.to_string() }))).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
