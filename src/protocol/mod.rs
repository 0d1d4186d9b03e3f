//! Relay wire protocol
//!
//! JSON text frames exchanged over `/ws/transcription`, discriminated by a
//! snake_case `type` tag with camelCase fields:
//! - client -> relay: `start_transcription`, `end_transcription`,
//!   `audio_chunk`, `subscribe`
//! - relay -> client: `connected`, `transcription_started`,
//!   `transcription_chunk`, `transcription_completed`, `transcription_error`

mod messages;

pub use messages::{ClientMessage, ServerMessage};
