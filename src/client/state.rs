use tracing::{debug, info};

use crate::protocol::ServerMessage;

/// Engine errors carrying this marker are routine hiccups the backend
/// recovers from on its own; they are never surfaced
const BENIGN_ERROR_MARKER: &str = "continuing";

/// Local mirror of the relay connection, updated only from server messages
#[derive(Debug, Clone, Default)]
pub struct ClientState {
    pub connected: bool,
    pub transcribing: bool,
    pub accumulated_text: String,
    pub session_id: Option<String>,
}

/// Events surfaced to the embedding application
#[derive(Debug, Clone, PartialEq)]
pub enum RelayEvent {
    /// Incremental transcript chunk plus the server's accumulated text
    Chunk { text: String, accumulated: String },
    /// The session finished with this full transcript
    Completed { final_text: String, meeting_id: i64 },
    /// Engine failure while a session was actively transcribing
    Error { message: String },
}

pub(crate) fn is_benign_error(message: &str) -> bool {
    message.contains(BENIGN_ERROR_MARKER)
}

/// Apply one server message to the local state
///
/// Returns the event the application should see, if any. Messages missing
/// expected fields are tolerated and dropped rather than treated as
/// protocol errors.
pub(crate) fn apply_server_message(
    state: &mut ClientState,
    msg: ServerMessage,
) -> Option<RelayEvent> {
    match msg {
        ServerMessage::Connected => {
            debug!("Relay acknowledged connection");
            None
        }

        ServerMessage::TranscriptionStarted { session_id } => {
            state.transcribing = true;
            info!(session_id = %session_id, "Transcription started");
            None
        }

        ServerMessage::TranscriptionChunk {
            text,
            accumulated_text,
        } => match (text, accumulated_text) {
            (Some(text), Some(accumulated)) => {
                state.accumulated_text = accumulated.clone();
                Some(RelayEvent::Chunk { text, accumulated })
            }
            _ => {
                debug!("Chunk missing text fields, ignoring");
                None
            }
        },

        ServerMessage::TranscriptionCompleted {
            final_text,
            meeting_id,
        } => {
            state.transcribing = false;
            let event = match (final_text, meeting_id) {
                (Some(final_text), Some(meeting_id)) => Some(RelayEvent::Completed {
                    final_text,
                    meeting_id,
                }),
                _ => None,
            };
            state.accumulated_text.clear();
            state.session_id = None;
            event
        }

        ServerMessage::TranscriptionError { error } => {
            let message = error?;
            if is_benign_error(&message) {
                debug!("Suppressing benign engine error: {}", message);
                return None;
            }
            if state.transcribing {
                Some(RelayEvent::Error { message })
            } else {
                debug!("Suppressing error outside active session: {}", message);
                None
            }
        }

        ServerMessage::Unknown => {
            debug!("Ignoring unknown relay message type");
            None
        }
    }
}
