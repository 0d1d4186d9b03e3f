use anyhow::Result;
use futures::stream::BoxStream;
use std::sync::Arc;

use super::memory::MemoryStt;
use super::messages::{AudioFrameMessage, TranscriptMessage};
use super::nats::NatsStt;
use crate::config::SttConfig;

/// Transport carrying audio frames to and transcript results from the
/// speech-to-text engine
#[async_trait::async_trait]
pub trait SttBackend: Send + Sync {
    /// Forward one audio frame to the engine
    async fn publish_audio(&self, frame: AudioFrameMessage) -> Result<()>;

    /// Stream of transcript results across all sessions
    ///
    /// Results carry the session id they belong to; the relay routes them,
    /// the backend does not filter.
    async fn transcripts(&self) -> Result<BoxStream<'static, TranscriptMessage>>;

    /// Backend name for logging
    fn name(&self) -> &str;
}

/// Which STT transport to run against
#[derive(Debug, Clone)]
pub enum SttSource {
    /// NATS pub/sub (production)
    Nats { url: String },
    /// In-process backend (tests, local development without a broker)
    Memory,
}

impl SttSource {
    pub fn from_config(cfg: &SttConfig) -> Result<Self> {
        match cfg.backend.as_str() {
            "nats" => Ok(Self::Nats {
                url: cfg.nats_url.clone(),
            }),
            "memory" => Ok(Self::Memory),
            other => anyhow::bail!("Unknown STT backend: {}", other),
        }
    }
}

/// STT backend factory
pub struct SttBackendFactory;

impl SttBackendFactory {
    /// Create the backend for the configured source
    pub async fn create(source: SttSource) -> Result<Arc<dyn SttBackend>> {
        match source {
            SttSource::Nats { url } => {
                let backend = NatsStt::connect(&url).await?;
                Ok(Arc::new(backend))
            }
            SttSource::Memory => Ok(Arc::new(MemoryStt::new())),
        }
    }
}
