use anyhow::{Context, Result};
use async_nats::Client;
use futures::stream::BoxStream;
use futures::StreamExt;
use tracing::{debug, info, warn};

use super::backend::SttBackend;
use super::messages::{AudioFrameMessage, TranscriptMessage};

/// Subject prefix audio frames are published under, suffixed with the
/// session id
const AUDIO_SUBJECT_PREFIX: &str = "stt.audio.session-";

/// Wildcard subject the engine publishes transcripts to
const TRANSCRIPT_SUBJECT: &str = "stt.text.>";

/// NATS-backed STT transport
pub struct NatsStt {
    client: Client,
}

impl NatsStt {
    /// Connect to the NATS server
    pub async fn connect(url: &str) -> Result<Self> {
        info!("Connecting to NATS at {}", url);

        let client = async_nats::connect(url)
            .await
            .context("Failed to connect to NATS")?;

        info!("Connected to NATS successfully");

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl SttBackend for NatsStt {
    async fn publish_audio(&self, frame: AudioFrameMessage) -> Result<()> {
        let subject = format!("{}{}", AUDIO_SUBJECT_PREFIX, frame.session_id);
        let payload = serde_json::to_vec(&frame)?;

        debug!(
            "Publishing audio frame to {} (sequence={}, bytes={}, final={})",
            subject,
            frame.sequence,
            frame.audio.len(),
            frame.final_frame
        );

        self.client
            .publish(subject, payload.into())
            .await
            .context("Failed to publish audio frame")?;

        Ok(())
    }

    async fn transcripts(&self) -> Result<BoxStream<'static, TranscriptMessage>> {
        info!("Subscribing to transcripts on {}", TRANSCRIPT_SUBJECT);

        let subscriber = self
            .client
            .subscribe(TRANSCRIPT_SUBJECT)
            .await
            .context("Failed to subscribe to transcripts")?;

        let stream = subscriber.filter_map(|msg| async move {
            match serde_json::from_slice::<TranscriptMessage>(&msg.payload) {
                Ok(transcript) => Some(transcript),
                Err(e) => {
                    warn!("Failed to parse transcript message: {}", e);
                    None
                }
            }
        });

        Ok(stream.boxed())
    }

    fn name(&self) -> &str {
        "nats"
    }
}
