use std::sync::Arc;
use std::time::Duration;

use crate::cache::TranscriptCache;
use crate::relay::SessionRegistry;
use crate::stt::SttBackend;

/// Shared application state for HTTP handlers and the relay socket
#[derive(Clone)]
pub struct AppState {
    /// Active transcription sessions, keyed by session id
    pub registry: Arc<SessionRegistry>,

    /// Transport to the STT engine
    pub backend: Arc<dyn SttBackend>,

    /// Completed transcripts, retained past session teardown
    pub cache: Arc<TranscriptCache>,
}

impl AppState {
    pub fn new(backend: Arc<dyn SttBackend>, transcript_ttl: Duration) -> Self {
        Self {
            registry: Arc::new(SessionRegistry::new()),
            backend,
            cache: Arc::new(TranscriptCache::new(transcript_ttl)),
        }
    }
}
