// ABOUTME: Error types for swarmdeck-core.
// ABOUTME: PanelError covers configuration, request validation, capacity, launch and rule failures.

use thiserror::Error;

/// Error types for panel operations.
#[derive(Error, Debug)]
pub enum PanelError {
    /// Required configuration is missing or malformed (e.g. no API token).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The request is missing a required field or carries an invalid value.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The slot set is already at capacity.
    #[error("All {max} slots are in use")]
    CapacityExceeded { max: usize },

    /// The category is already in the slot set.
    #[error("Category {0} is already active")]
    AlreadyActive(String),

    /// The panel has been marked offline by an operator.
    #[error("Panel is offline")]
    Offline,

    /// A shared secret was required and missing or wrong.
    #[error("Unauthorized")]
    Unauthorized,

    /// The swarm client could not be launched.
    #[error("Failed to launch swarm: {0}")]
    Launch(String),

    /// A rewrite rule failed to compile.
    #[error("Invalid rule in [{section}]: {pattern}: {reason}")]
    Rules {
        section: &'static str,
        pattern: String,
        reason: String,
    },

    /// IO error for file and process operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using PanelError.
pub type Result<T> = std::result::Result<T, PanelError>;
