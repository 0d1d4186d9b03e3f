use anyhow::{Context, Result};
use base64::Engine;
use futures::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use super::state::{apply_server_message, ClientState, RelayEvent};
use crate::protocol::{ClientMessage, ServerMessage};

/// Derive the relay socket endpoint from the service's base URL, upgrading
/// the scheme to its socket equivalent
pub fn relay_endpoint(base_url: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');
    let upgraded = if let Some(rest) = trimmed.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = trimmed.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        trimmed.to_string()
    };
    format!("{}/ws/transcription", upgraded)
}

struct Connection {
    outbound: mpsc::UnboundedSender<ClientMessage>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

struct ClientInner {
    endpoint: String,
    state: Mutex<ClientState>,
    conn: Mutex<Option<Connection>>,
    connecting: AtomicBool,
    events_tx: mpsc::UnboundedSender<RelayEvent>,
}

/// Handle to one relay connection
///
/// Send operations are synchronous and fire-and-forget: they check local
/// readiness, queue the frame to the writer task, and degrade to a logged
/// `false` when the connection or session is not ready. State transitions
/// (transcribing, accumulated text) happen only when the server's messages
/// arrive on the reader task.
pub struct RelayClient {
    inner: Arc<ClientInner>,
}

impl RelayClient {
    /// Create a client for the relay at `base_url`, returning the event
    /// stream the application consumes
    pub fn new(base_url: &str) -> (Self, mpsc::UnboundedReceiver<RelayEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let client = Self {
            inner: Arc::new(ClientInner {
                endpoint: relay_endpoint(base_url),
                state: Mutex::new(ClientState::default()),
                conn: Mutex::new(None),
                connecting: AtomicBool::new(false),
                events_tx,
            }),
        };
        (client, events_rx)
    }

    /// Open the relay socket; a no-op while a connection is open or opening
    pub async fn connect(&self) -> Result<()> {
        if self.inner.connecting.swap(true, Ordering::SeqCst) {
            debug!("Connect already in progress, ignoring");
            return Ok(());
        }
        let result = self.do_connect().await;
        self.inner.connecting.store(false, Ordering::SeqCst);
        result
    }

    async fn do_connect(&self) -> Result<()> {
        {
            let conn = self.inner.conn.lock().unwrap();
            if let Some(existing) = conn.as_ref() {
                if !existing.reader.is_finished() {
                    debug!("Relay already connected, ignoring connect");
                    return Ok(());
                }
            }
        }

        let (socket, _response) = tokio_tungstenite::connect_async(self.inner.endpoint.as_str())
            .await
            .with_context(|| format!("Failed to open relay socket {}", self.inner.endpoint))?;
        info!(endpoint = %self.inner.endpoint, "Relay socket open");

        let (mut sink, mut stream) = socket.split();
        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<ClientMessage>();

        self.inner.state.lock().unwrap().connected = true;

        let writer = tokio::spawn(async move {
            while let Some(msg) = outbound_rx.recv().await {
                let text = match serde_json::to_string(&msg) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!("Failed to encode relay frame: {}", e);
                        continue;
                    }
                };
                if sink.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
            let _ = sink.close().await;
        });

        let inner = Arc::clone(&self.inner);
        let reader = tokio::spawn(async move {
            while let Some(frame) = stream.next().await {
                match frame {
                    Ok(Message::Text(text)) => match serde_json::from_str::<ServerMessage>(&text)
                    {
                        Ok(msg) => {
                            let event = {
                                let mut state = inner.state.lock().unwrap();
                                apply_server_message(&mut state, msg)
                            };
                            if let Some(event) = event {
                                let _ = inner.events_tx.send(event);
                            }
                        }
                        Err(e) => warn!("Malformed relay message, skipping: {}", e),
                    },
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        warn!("Relay socket error: {}", e);
                        break;
                    }
                }
            }
            inner.state.lock().unwrap().connected = false;
            debug!("Relay reader finished");
        });

        *self.inner.conn.lock().unwrap() = Some(Connection {
            outbound: outbound_tx,
            reader,
            writer,
        });
        Ok(())
    }

    /// Close the socket and reset all local state; safe to call repeatedly
    pub fn disconnect(&self) {
        if let Some(conn) = self.inner.conn.lock().unwrap().take() {
            conn.reader.abort();
            conn.writer.abort();
            info!("Relay socket closed");
        }
        let mut state = self.inner.state.lock().unwrap();
        *state = ClientState::default();
    }

    /// Request a new transcription session
    ///
    /// Resets the accumulated mirror and records the session id, but the
    /// transcribing flag flips only when the server acknowledges with
    /// `transcription_started`. Returns false when the socket is not open.
    pub fn start_transcription(&self, session_id: &str, meeting_id: i64, user_id: i64) -> bool {
        let Some(outbound) = self.inner.outbound_if_open() else {
            warn!("start_transcription before relay socket is open, ignoring");
            return false;
        };
        {
            let mut state = self.inner.state.lock().unwrap();
            state.accumulated_text.clear();
            state.session_id = Some(session_id.to_string());
        }
        let sent = outbound
            .send(ClientMessage::StartTranscription {
                session_id: session_id.to_string(),
                meeting_id,
                user_id,
            })
            .is_ok();
        if sent {
            info!(session_id = %session_id, meeting_id, "Requested transcription start");
        }
        sent
    }

    /// Request the active session end; a no-op without one
    ///
    /// Local session state is cleared when the server confirms completion,
    /// not here.
    pub fn end_transcription(&self) {
        let session_id = { self.inner.state.lock().unwrap().session_id.clone() };
        let Some(session_id) = session_id else {
            debug!("end_transcription without active session, ignoring");
            return;
        };
        let Some(outbound) = self.inner.outbound_if_open() else {
            warn!("end_transcription while relay socket is closed, ignoring");
            return;
        };
        if outbound
            .send(ClientMessage::EndTranscription {
                session_id: session_id.clone(),
            })
            .is_ok()
        {
            info!(session_id = %session_id, "Requested transcription end");
        }
    }

    /// Send one chunk of encoded audio for the active session
    pub fn send_audio_chunk(&self, audio: &[u8]) -> bool {
        self.inner.send_audio_chunk(audio)
    }

    /// Attach to another session's transcript stream, best-effort
    pub fn subscribe_to_session(&self, session_id: &str) {
        let Some(outbound) = self.inner.outbound_if_open() else {
            debug!("subscribe while relay socket is closed, ignoring");
            return;
        };
        if outbound
            .send(ClientMessage::Subscribe {
                session_id: session_id.to_string(),
            })
            .is_ok()
        {
            debug!(session_id = %session_id, "Subscribed to session stream");
        }
    }

    /// Cloneable sink audio-capture code uses to push chunks without
    /// holding the whole client
    pub fn audio_sink(&self) -> AudioChunkSink {
        AudioChunkSink {
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.inner.state.lock().unwrap().connected
    }

    pub fn is_transcribing(&self) -> bool {
        self.inner.state.lock().unwrap().transcribing
    }

    pub fn accumulated_text(&self) -> String {
        self.inner.state.lock().unwrap().accumulated_text.clone()
    }

    pub fn active_session(&self) -> Option<String> {
        self.inner.state.lock().unwrap().session_id.clone()
    }

    /// Snapshot of the full local state
    pub fn state(&self) -> ClientState {
        self.inner.state.lock().unwrap().clone()
    }
}

impl ClientInner {
    /// Outbound queue of the live connection, or None when closed
    fn outbound_if_open(&self) -> Option<mpsc::UnboundedSender<ClientMessage>> {
        if !self.state.lock().unwrap().connected {
            return None;
        }
        self.conn
            .lock()
            .unwrap()
            .as_ref()
            .map(|c| c.outbound.clone())
    }

    fn send_audio_chunk(&self, audio: &[u8]) -> bool {
        let session_id = { self.state.lock().unwrap().session_id.clone() };
        let Some(session_id) = session_id else {
            debug!("Audio chunk before any session started, dropping");
            return false;
        };
        let Some(outbound) = self.outbound_if_open() else {
            debug!("Audio chunk while relay socket is closed, dropping");
            return false;
        };
        outbound
            .send(ClientMessage::AudioChunk {
                session_id,
                audio_data: base64::engine::general_purpose::STANDARD.encode(audio),
            })
            .is_ok()
    }
}

/// Injected dependency for audio-capture code: pushes encoded chunks into
/// whatever session the owning client currently has active
#[derive(Clone)]
pub struct AudioChunkSink {
    inner: Arc<ClientInner>,
}

impl AudioChunkSink {
    /// Send one chunk; same readiness rules as
    /// [`RelayClient::send_audio_chunk`]
    pub fn send(&self, audio: &[u8]) -> bool {
        self.inner.send_audio_chunk(audio)
    }
}
