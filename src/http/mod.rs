//! HTTP API server
//!
//! This module provides the relay's HTTP surface:
//! - GET /ws/transcription - WebSocket upgrade to the relay
//! - GET /sessions/:id/status - Query live session status
//! - GET /meetings/:id/transcript - Get the completed or live transcript
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
