use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::registry::StartOutcome;
use crate::cache::transcript_key;
use crate::http::AppState;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::stt::AudioFrameMessage;

/// GET /ws/transcription
/// Upgrade to the relay socket
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Per-connection event loop
///
/// Outbound frames (acks plus fan-out from the transcript pump) arrive on an
/// unbounded channel; inbound frames are dispatched by their `type` tag.
/// Nothing a client sends tears the connection down except closing it.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let conn_id = format!("conn-{}", uuid::Uuid::new_v4());
    info!(connection = %conn_id, "Relay connection established");

    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<ServerMessage>();
    let _ = outbound_tx.send(ServerMessage::Connected);

    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            Some(msg) = outbound_rx.recv() => {
                let text = match serde_json::to_string(&msg) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(connection = %conn_id, "Failed to encode relay frame: {}", e);
                        continue;
                    }
                };
                if sink.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
            inbound = stream.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        handle_client_frame(&text, &conn_id, &outbound_tx, &state).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {} // ping/pong/binary, handled by axum or ignored
                    Some(Err(e)) => {
                        warn!(connection = %conn_id, "Relay socket error: {}", e);
                        break;
                    }
                }
            }
        }
    }

    teardown(&conn_id, &state).await;
}

async fn handle_client_frame(
    text: &str,
    conn_id: &str,
    outbound_tx: &mpsc::UnboundedSender<ServerMessage>,
    state: &AppState,
) {
    let msg = match serde_json::from_str::<ClientMessage>(text) {
        Ok(msg) => msg,
        Err(e) => {
            warn!(connection = %conn_id, "Malformed relay frame, skipping: {}", e);
            return;
        }
    };

    match msg {
        ClientMessage::StartTranscription {
            session_id,
            meeting_id,
            user_id,
        } => {
            let outcome = state
                .registry
                .start_session(&session_id, meeting_id, user_id, conn_id, outbound_tx.clone())
                .await;
            if outcome == StartOutcome::AlreadyActive {
                warn!(
                    session_id = %session_id,
                    "Session already active, re-acknowledging"
                );
            } else {
                info!(
                    session_id = %session_id,
                    meeting_id,
                    user_id,
                    "Transcription session started"
                );
            }
            let _ = outbound_tx.send(ServerMessage::TranscriptionStarted { session_id });
        }

        ClientMessage::AudioChunk {
            session_id,
            audio_data,
        } => {
            let Some(sequence) = state.registry.next_audio_sequence(&session_id).await else {
                debug!(session_id = %session_id, "Audio chunk for inactive session, dropping");
                return;
            };
            let frame = AudioFrameMessage::chunk(&session_id, sequence, audio_data);
            if let Err(e) = state.backend.publish_audio(frame).await {
                error!(session_id = %session_id, "Failed to forward audio frame: {}", e);
            }
        }

        ClientMessage::EndTranscription { session_id } => {
            let Some(sequence) = state.registry.final_sequence(&session_id).await else {
                debug!(session_id = %session_id, "End for unknown session, ignoring");
                return;
            };
            let frame = AudioFrameMessage::final_marker(&session_id, sequence);
            if let Err(e) = state.backend.publish_audio(frame).await {
                error!(session_id = %session_id, "Failed to publish final frame: {}", e);
            }
            // Completion is confirmed once the engine flushes its final
            // transcript; the session stays registered until then
            info!(session_id = %session_id, "Transcription end requested");
        }

        ClientMessage::Subscribe { session_id } => {
            if state
                .registry
                .subscribe(&session_id, conn_id, outbound_tx.clone())
                .await
            {
                info!(connection = %conn_id, session_id = %session_id, "Subscribed to session");
            } else {
                debug!(session_id = %session_id, "Subscribe to unknown session, ignoring");
            }
        }

        ClientMessage::Unknown => {
            debug!(connection = %conn_id, "Ignoring unknown message type");
        }
    }
}

/// Clear everything the connection owned: end its sessions, cache their
/// transcripts, tell the engine to stop, detach it everywhere
async fn teardown(conn_id: &str, state: &AppState) {
    let closed = state.registry.close_owned(conn_id).await;
    for done in closed {
        let frame = AudioFrameMessage::final_marker(&done.session_id, done.final_sequence);
        if let Err(e) = state.backend.publish_audio(frame).await {
            warn!(session_id = %done.session_id, "Failed to publish final frame: {}", e);
        }
        state
            .cache
            .set(&transcript_key(done.meeting_id), done.final_text)
            .await;
    }
    state.registry.drop_connection(conn_id).await;
    info!(connection = %conn_id, "Relay connection closed");
}
