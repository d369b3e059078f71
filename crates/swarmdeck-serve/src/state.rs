// ABOUTME: Shared state handed to every axum handler.
// ABOUTME: The Panel plus the command-queue secret and the optional Discord verifier.

use axum::http::HeaderMap;
use swarmdeck_core::{Panel, PanelError};
use swarmdeck_discord::SignatureVerifier;

/// Header carrying the command-queue secret.
pub const COMMAND_SECRET_HEADER: &str = "x-command-secret";

#[derive(Clone)]
pub struct AppState {
    pub panel: Panel,
    pub command_secret: Option<String>,
    pub verifier: Option<SignatureVerifier>,
}

impl AppState {
    pub fn new(panel: Panel) -> Self {
        Self {
            panel,
            command_secret: None,
            verifier: None,
        }
    }

    pub fn with_command_secret(mut self, secret: Option<String>) -> Self {
        self.command_secret = secret;
        self
    }

    pub fn with_verifier(mut self, verifier: Option<SignatureVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    /// Check the command-queue secret. Open when no secret is configured.
    pub fn authorize_commands(&self, headers: &HeaderMap) -> Result<(), PanelError> {
        let Some(expected) = self.command_secret.as_deref() else {
            return Ok(());
        };
        let provided = headers
            .get(COMMAND_SECRET_HEADER)
            .and_then(|v| v.to_str().ok());
        if provided == Some(expected) {
            Ok(())
        } else {
            Err(PanelError::Unauthorized)
        }
    }
}
