use serde::{Deserialize, Serialize};

/// Audio frame forwarded to the STT engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioFrameMessage {
    pub session_id: String,
    /// Monotonic per-session sequence number
    pub sequence: u32,
    /// Base64-encoded audio bytes; empty on the final frame
    pub audio: String,
    /// RFC3339 timestamp
    pub timestamp: String,
    /// Marks the last frame of the session
    #[serde(rename = "final")]
    pub final_frame: bool,
}

impl AudioFrameMessage {
    /// Frame carrying one chunk of encoded audio
    pub fn chunk(session_id: &str, sequence: u32, audio: String) -> Self {
        Self {
            session_id: session_id.to_string(),
            sequence,
            audio,
            timestamp: chrono::Utc::now().to_rfc3339(),
            final_frame: false,
        }
    }

    /// Empty end-of-session marker
    pub fn final_marker(session_id: &str, sequence: u32) -> Self {
        Self {
            session_id: session_id.to_string(),
            sequence,
            audio: String::new(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            final_frame: true,
        }
    }
}

/// Transcript result published by the STT engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptMessage {
    pub session_id: String,
    pub text: String,
    /// Interim result that may still be revised by the engine
    pub partial: bool,
    /// Marks the engine's last result for the session
    #[serde(default, rename = "final")]
    pub final_result: bool,
    /// Confidence score (0.0 to 1.0), if the engine reports one
    #[serde(default)]
    pub confidence: Option<f32>,
    pub timestamp: String,
}
