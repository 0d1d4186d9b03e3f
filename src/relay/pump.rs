use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::cache::transcript_key;
use crate::http::AppState;

/// Spawn the background task that routes STT results to session subscribers
///
/// One pump runs per relay process. Completed transcripts are written to the
/// cache so they outlive the session that produced them.
pub fn spawn_transcript_pump(state: AppState) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut transcripts = match state.backend.transcripts().await {
            Ok(stream) => stream,
            Err(e) => {
                error!("Failed to subscribe to transcript stream: {}", e);
                return;
            }
        };

        info!("Transcript pump started ({})", state.backend.name());

        while let Some(msg) = transcripts.next().await {
            if let Some(done) = state.registry.route_transcript(&msg).await {
                state
                    .cache
                    .set(&transcript_key(done.meeting_id), done.final_text)
                    .await;
            }
        }

        warn!("Transcript stream ended, pump exiting");
    })
}
