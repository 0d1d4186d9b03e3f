use serde::{Deserialize, Serialize};

/// Control and data frames sent by a capture client over the relay socket
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Begin a transcription session for a meeting
    #[serde(rename_all = "camelCase")]
    StartTranscription {
        session_id: String,
        meeting_id: i64,
        user_id: i64,
    },

    /// End the named session; the relay confirms with `transcription_completed`
    /// once the engine has flushed its final result
    #[serde(rename_all = "camelCase")]
    EndTranscription { session_id: String },

    /// One opaque chunk of encoded audio (base64) for an active session
    #[serde(rename_all = "camelCase")]
    AudioChunk {
        session_id: String,
        audio_data: String,
    },

    /// Attach this connection to the named session's transcript stream
    #[serde(rename_all = "camelCase")]
    Subscribe { session_id: String },

    /// Any tag this relay does not recognize; ignored, never an error
    #[serde(other)]
    Unknown,
}

/// Frames sent by the relay to connected clients
///
/// Fields that the backend may omit are optional; receivers tolerate missing
/// fields rather than treating them as protocol errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Greeting sent once per connection, informational only
    Connected,

    /// The engine has begun consuming audio for this session
    #[serde(rename_all = "camelCase")]
    TranscriptionStarted { session_id: String },

    /// One incremental transcript chunk plus the relay's authoritative
    /// accumulated text
    #[serde(rename_all = "camelCase")]
    TranscriptionChunk {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        accumulated_text: Option<String>,
    },

    /// Session finished; `transcription_final` is the legacy spelling still
    /// accepted inbound
    #[serde(rename_all = "camelCase", alias = "transcription_final")]
    TranscriptionCompleted {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        final_text: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        meeting_id: Option<i64>,
    },

    /// Engine-reported failure; `error` is the legacy spelling
    #[serde(rename_all = "camelCase", alias = "error")]
    TranscriptionError {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    /// Forward-compatible catch-all for unrecognized tags
    #[serde(other)]
    Unknown,
}
