use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info};

use super::session::{RelaySession, SessionStatus};
use crate::protocol::ServerMessage;
use crate::stt::TranscriptMessage;

/// Outbound channel of one connected client
pub type Subscriber = mpsc::UnboundedSender<ServerMessage>;

/// Result of a `start_transcription` request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Created,
    /// The session id was already active; it is re-acknowledged without
    /// resetting accumulated state
    AlreadyActive,
}

/// A session that just finished, with everything the caller needs to cache
/// the transcript and notify the engine
#[derive(Debug, Clone)]
pub struct CompletedSession {
    pub session_id: String,
    pub meeting_id: i64,
    pub final_text: String,
    pub final_sequence: u32,
}

struct SessionEntry {
    session: RelaySession,
    subscribers: Vec<(String, Subscriber)>,
}

/// Multiplexes concurrent transcription sessions by session id
///
/// Inbound transcripts are routed by the session id they carry, never by an
/// ambient "current session" slot, so any number of sessions can run over
/// the registry at once.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, SessionEntry>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Create a session owned by `conn_id`, subscribing it to the transcript
    /// stream. Starting an id that is already active attaches the connection
    /// but leaves the session untouched.
    pub async fn start_session(
        &self,
        session_id: &str,
        meeting_id: i64,
        user_id: i64,
        conn_id: &str,
        subscriber: Subscriber,
    ) -> StartOutcome {
        let mut sessions = self.sessions.write().await;
        match sessions.entry(session_id.to_string()) {
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                if !entry.subscribers.iter().any(|(c, _)| c == conn_id) {
                    entry.subscribers.push((conn_id.to_string(), subscriber));
                }
                StartOutcome::AlreadyActive
            }
            Entry::Vacant(vacant) => {
                vacant.insert(SessionEntry {
                    session: RelaySession::new(session_id, meeting_id, user_id, conn_id),
                    subscribers: vec![(conn_id.to_string(), subscriber)],
                });
                StartOutcome::Created
            }
        }
    }

    /// Attach a connection to a session's transcript stream. Returns false
    /// if the session does not exist.
    pub async fn subscribe(&self, session_id: &str, conn_id: &str, subscriber: Subscriber) -> bool {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(session_id) {
            Some(entry) => {
                if !entry.subscribers.iter().any(|(c, _)| c == conn_id) {
                    entry.subscribers.push((conn_id.to_string(), subscriber));
                }
                true
            }
            None => false,
        }
    }

    /// Claim the sequence number for one audio chunk. Returns None when the
    /// session is missing or no longer transcribing, in which case the chunk
    /// is dropped.
    pub async fn next_audio_sequence(&self, session_id: &str) -> Option<u32> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(session_id)?;
        if !entry.session.is_transcribing() {
            return None;
        }
        entry.session.record_chunk();
        Some(entry.session.next_sequence())
    }

    /// Claim the sequence number for the end-of-session marker
    pub async fn final_sequence(&self, session_id: &str) -> Option<u32> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(session_id)?;
        Some(entry.session.next_sequence())
    }

    /// Route one STT result to the session it names
    ///
    /// Partial results grow the accumulated text and broadcast a chunk;
    /// final results complete the session, broadcast completion, and remove
    /// it. Returns the completion record when the session finished. Results
    /// for unknown sessions are dropped.
    pub async fn route_transcript(&self, msg: &TranscriptMessage) -> Option<CompletedSession> {
        let mut sessions = self.sessions.write().await;
        let Some(entry) = sessions.get_mut(&msg.session_id) else {
            debug!(
                session_id = %msg.session_id,
                "Transcript for unknown session, dropping"
            );
            return None;
        };

        if msg.final_result {
            let meeting_id = entry.session.meeting_id();
            let final_sequence = entry.session.next_sequence();
            let accumulated = entry.session.finish();
            // Prefer the engine's full-session text when it sends one
            let final_text = if msg.text.trim().is_empty() {
                accumulated
            } else {
                msg.text.clone()
            };

            let out = ServerMessage::TranscriptionCompleted {
                final_text: Some(final_text.clone()),
                meeting_id: Some(meeting_id),
            };
            fan_out(&mut entry.subscribers, &out);

            let session_id = msg.session_id.clone();
            sessions.remove(&session_id);
            info!(session_id = %session_id, meeting_id, "Session completed");

            Some(CompletedSession {
                session_id,
                meeting_id,
                final_text,
                final_sequence,
            })
        } else {
            let accumulated = entry.session.append_segment(&msg.text);
            let out = ServerMessage::TranscriptionChunk {
                text: Some(msg.text.clone()),
                accumulated_text: Some(accumulated),
            };
            fan_out(&mut entry.subscribers, &out);
            None
        }
    }

    /// End and remove every session owned by a closing connection,
    /// notifying the remaining subscribers with the accumulated text
    pub async fn close_owned(&self, conn_id: &str) -> Vec<CompletedSession> {
        let mut sessions = self.sessions.write().await;
        let owned: Vec<String> = sessions
            .iter()
            .filter(|(_, entry)| entry.session.owner() == conn_id)
            .map(|(id, _)| id.clone())
            .collect();

        let mut completed = Vec::new();
        for session_id in owned {
            if let Some(mut entry) = sessions.remove(&session_id) {
                let meeting_id = entry.session.meeting_id();
                let final_sequence = entry.session.next_sequence();
                let final_text = entry.session.finish();

                entry.subscribers.retain(|(c, _)| c != conn_id);
                let out = ServerMessage::TranscriptionCompleted {
                    final_text: Some(final_text.clone()),
                    meeting_id: Some(meeting_id),
                };
                fan_out(&mut entry.subscribers, &out);

                info!(
                    session_id = %session_id,
                    meeting_id,
                    "Session ended by connection close"
                );
                completed.push(CompletedSession {
                    session_id,
                    meeting_id,
                    final_text,
                    final_sequence,
                });
            }
        }
        completed
    }

    /// Detach a connection from every subscriber set
    pub async fn drop_connection(&self, conn_id: &str) {
        let mut sessions = self.sessions.write().await;
        for entry in sessions.values_mut() {
            entry.subscribers.retain(|(c, _)| c != conn_id);
        }
    }

    pub async fn session_status(&self, session_id: &str) -> Option<SessionStatus> {
        let sessions = self.sessions.read().await;
        sessions.get(session_id).map(|e| e.session.status())
    }

    /// Accumulated text of the live session recording a meeting, if any
    pub async fn live_accumulated(&self, meeting_id: i64) -> Option<String> {
        let sessions = self.sessions.read().await;
        sessions
            .values()
            .find(|e| e.session.meeting_id() == meeting_id)
            .map(|e| e.session.accumulated().to_string())
    }

    pub async fn contains(&self, session_id: &str) -> bool {
        self.sessions.read().await.contains_key(session_id)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Send to every subscriber, pruning the ones whose connection is gone
fn fan_out(subscribers: &mut Vec<(String, Subscriber)>, msg: &ServerMessage) {
    subscribers.retain(|(conn_id, tx)| match tx.send(msg.clone()) {
        Ok(()) => true,
        Err(_) => {
            debug!(connection = %conn_id, "Dropping closed subscriber");
            false
        }
    });
}
