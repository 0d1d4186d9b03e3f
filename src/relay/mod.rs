//! Transcription relay
//!
//! This module is the server half of the relay protocol:
//! - `session` holds per-session state (authoritative accumulated text,
//!   sequence counter, transcribing flag)
//! - `registry` multiplexes concurrent sessions by session id and fans
//!   transcripts out to subscribers
//! - `socket` terminates `/ws/transcription` connections and dispatches
//!   inbound frames
//! - `pump` routes the STT transcript stream back into the registry

mod pump;
mod registry;
mod session;
pub mod socket;

pub use pump::spawn_transcript_pump;
pub use registry::{CompletedSession, SessionRegistry, StartOutcome};
pub use session::{RelaySession, SessionStatus};
