// ABOUTME: HTTP control surface for the swarmdeck panel.
// ABOUTME: axum routes for start/stop/status, SSE and WebSocket log streams, command queue, Discord webhook.

pub mod error;
pub mod routes;
pub mod server;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use server::{router, run};
pub use state::{AppState, COMMAND_SECRET_HEADER};
