// ABOUTME: Discord interactions webhook.
// ABOUTME: Verifies the Ed25519 signature before decoding and answering the interaction.

use crate::error::ApiResult;
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use swarmdeck_core::PanelError;
use swarmdeck_discord::{Interaction, InteractionResponse, SIGNATURE_HEADER, TIMESTAMP_HEADER};
use tracing::warn;

pub async fn interactions(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<InteractionResponse>> {
    let verifier = state.verifier.as_ref().ok_or(PanelError::Unauthorized)?;
    let (Some(signature), Some(timestamp)) = (
        header(&headers, SIGNATURE_HEADER),
        header(&headers, TIMESTAMP_HEADER),
    ) else {
        return Err(PanelError::Unauthorized.into());
    };

    if let Err(e) = verifier.verify(signature, timestamp, &body) {
        warn!(error = %e, "Rejected Discord interaction");
        return Err(PanelError::Unauthorized.into());
    }

    let interaction: Interaction = serde_json::from_slice(&body)?;
    Ok(Json(swarmdeck_discord::respond(&interaction, &state.panel).await))
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
