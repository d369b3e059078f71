// ABOUTME: HTTP route handlers grouped by concern.
// ABOUTME: control (start/stop/status), stream (SSE/WebSocket), commands (queue), interactions (Discord).

pub mod commands;
pub mod control;
pub mod interactions;
pub mod stream;
