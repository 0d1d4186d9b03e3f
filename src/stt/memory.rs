use anyhow::Result;
use futures::stream::BoxStream;
use futures::StreamExt;
use std::sync::Mutex;
use tokio::sync::broadcast;
use tracing::warn;

use super::backend::SttBackend;
use super::messages::{AudioFrameMessage, TranscriptMessage};

/// In-process STT transport
///
/// Records every published audio frame and lets callers inject transcript
/// results by hand. Used by the end-to-end relay tests and by local
/// development runs without a broker (`backend = "memory"`).
pub struct MemoryStt {
    frames: Mutex<Vec<AudioFrameMessage>>,
    transcript_tx: broadcast::Sender<TranscriptMessage>,
    /// Receiver subscribed at construction so injections are never lost to
    /// the gap before the transcript pump starts
    initial_rx: Mutex<Option<broadcast::Receiver<TranscriptMessage>>>,
}

impl MemoryStt {
    pub fn new() -> Self {
        let (transcript_tx, initial_rx) = broadcast::channel(256);
        Self {
            frames: Mutex::new(Vec::new()),
            transcript_tx,
            initial_rx: Mutex::new(Some(initial_rx)),
        }
    }

    /// Inject a transcript result as if the engine produced it
    pub fn inject_transcript(&self, transcript: TranscriptMessage) {
        let _ = self.transcript_tx.send(transcript);
    }

    /// All audio frames published so far, in arrival order
    pub fn recorded_frames(&self) -> Vec<AudioFrameMessage> {
        self.frames.lock().unwrap().clone()
    }
}

impl Default for MemoryStt {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SttBackend for MemoryStt {
    async fn publish_audio(&self, frame: AudioFrameMessage) -> Result<()> {
        self.frames.lock().unwrap().push(frame);
        Ok(())
    }

    async fn transcripts(&self) -> Result<BoxStream<'static, TranscriptMessage>> {
        let rx = self
            .initial_rx
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| self.transcript_tx.subscribe());

        let stream = futures::stream::unfold(rx, |mut rx| async move {
            loop {
                match rx.recv().await {
                    Ok(transcript) => return Some((transcript, rx)),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Transcript stream lagged, skipped {} messages", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        });

        Ok(stream.boxed())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
