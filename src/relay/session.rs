use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-side state for one transcription session
///
/// The accumulated text lives here and only here; clients mirror it but
/// never concatenate locally, so chunk reordering on the client side cannot
/// cause drift.
#[derive(Debug)]
pub struct RelaySession {
    session_id: String,
    meeting_id: i64,
    user_id: i64,
    /// Connection that started the session; closing it ends the session
    owner: String,
    accumulated: String,
    transcribing: bool,
    started_at: DateTime<Utc>,
    next_sequence: u32,
    chunks_forwarded: usize,
}

impl RelaySession {
    pub fn new(session_id: &str, meeting_id: i64, user_id: i64, owner: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            meeting_id,
            user_id,
            owner: owner.to_string(),
            accumulated: String::new(),
            transcribing: true,
            started_at: Utc::now(),
            next_sequence: 0,
            chunks_forwarded: 0,
        }
    }

    pub fn meeting_id(&self) -> i64 {
        self.meeting_id
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn is_transcribing(&self) -> bool {
        self.transcribing
    }

    pub fn accumulated(&self) -> &str {
        &self.accumulated
    }

    /// Append one transcript segment, returning the new accumulated text
    pub fn append_segment(&mut self, text: &str) -> String {
        if !text.is_empty() {
            if !self.accumulated.is_empty() {
                self.accumulated.push(' ');
            }
            self.accumulated.push_str(text);
        }
        self.accumulated.clone()
    }

    /// Claim the next audio sequence number
    pub fn next_sequence(&mut self) -> u32 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        sequence
    }

    /// Count one forwarded audio chunk
    pub fn record_chunk(&mut self) {
        self.chunks_forwarded += 1;
    }

    /// End the session, taking the accumulated text
    pub fn finish(&mut self) -> String {
        self.transcribing = false;
        std::mem::take(&mut self.accumulated)
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            session_id: self.session_id.clone(),
            meeting_id: self.meeting_id,
            is_transcribing: self.transcribing,
            started_at: self.started_at,
            accumulated_chars: self.accumulated.chars().count(),
            chunks_forwarded: self.chunks_forwarded,
        }
    }
}

/// Snapshot of a live session, served by the status endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStatus {
    pub session_id: String,
    pub meeting_id: i64,
    pub is_transcribing: bool,
    pub started_at: DateTime<Utc>,
    pub accumulated_chars: usize,
    pub chunks_forwarded: usize,
}
