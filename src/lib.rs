pub mod cache;
pub mod client;
pub mod config;
pub mod http;
pub mod protocol;
pub mod relay;
pub mod stt;

pub use cache::{transcript_key, TranscriptCache};
pub use client::{relay_endpoint, AudioChunkSink, ClientState, RelayClient, RelayEvent};
pub use config::Config;
pub use http::{create_router, AppState};
pub use protocol::{ClientMessage, ServerMessage};
pub use relay::{
    spawn_transcript_pump, CompletedSession, SessionRegistry, SessionStatus, StartOutcome,
};
pub use stt::{
    AudioFrameMessage, MemoryStt, NatsStt, SttBackend, SttBackendFactory, SttSource,
    TranscriptMessage,
};
