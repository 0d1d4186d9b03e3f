use super::state::AppState;
use crate::cache::transcript_key;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub meeting_id: i64,
    pub transcript: String,
    /// True when the session is still recording and this is the accumulated
    /// text so far
    pub live: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /sessions/:session_id/status
/// Status of a live transcription session
pub async fn get_session_status(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    match state.registry.session_status(&session_id).await {
        Some(status) => (StatusCode::OK, Json(status)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Session {} not found", session_id),
            }),
        )
            .into_response(),
    }
}

/// GET /meetings/:meeting_id/transcript
/// Completed transcript from the cache, or the live accumulated text while
/// the session is still running
pub async fn get_meeting_transcript(
    State(state): State<AppState>,
    Path(meeting_id): Path<i64>,
) -> impl IntoResponse {
    if let Some(transcript) = state.cache.get(&transcript_key(meeting_id)).await {
        return (
            StatusCode::OK,
            Json(TranscriptResponse {
                meeting_id,
                transcript,
                live: false,
            }),
        )
            .into_response();
    }

    if let Some(transcript) = state.registry.live_accumulated(meeting_id).await {
        return (
            StatusCode::OK,
            Json(TranscriptResponse {
                meeting_id,
                transcript,
                live: true,
            }),
        )
            .into_response();
    }

    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("No transcript for meeting {}", meeting_id),
        }),
    )
        .into_response()
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
