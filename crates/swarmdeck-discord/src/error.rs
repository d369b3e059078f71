// ABOUTME: Error types for swarmdeck-discord.
// ABOUTME: Defines DiscordError covering signature, key, REST and payload failures.

use thiserror::Error;

/// Error types for the Discord surface.
#[derive(Error, Debug)]
pub enum DiscordError {
    /// The configured public key is not 32 hex-encoded bytes.
    #[error("Invalid public key: {0}")]
    InvalidKey(String),

    /// The request signature is malformed or does not verify.
    #[error("Invalid request signature")]
    InvalidSignature,

    /// HTTP error talking to the Discord REST API.
    #[error("Discord API error: {0}")]
    Rest(#[from] reqwest::Error),

    /// Interaction payload could not be decoded.
    #[error("Malformed interaction: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Result type alias using DiscordError.
pub type Result<T> = std::result::Result<T, DiscordError>;
