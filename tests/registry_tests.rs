// Tests for session multiplexing and transcript routing.
//
// These drive the registry directly with channel subscribers, the same way
// the relay socket wires real connections in.

use dealcoach_relay::{ServerMessage, SessionRegistry, StartOutcome, TranscriptMessage};
use tokio::sync::mpsc;

fn partial(session_id: &str, text: &str) -> TranscriptMessage {
    TranscriptMessage {
        session_id: session_id.to_string(),
        text: text.to_string(),
        partial: true,
        final_result: false,
        confidence: Some(0.9),
        timestamp: "2026-08-06T10:00:00Z".to_string(),
    }
}

fn final_result(session_id: &str, text: &str) -> TranscriptMessage {
    TranscriptMessage {
        session_id: session_id.to_string(),
        text: text.to_string(),
        partial: false,
        final_result: true,
        confidence: None,
        timestamp: "2026-08-06T10:00:00Z".to_string(),
    }
}

#[tokio::test]
async fn test_start_session_is_idempotent() {
    let registry = SessionRegistry::new();
    let (tx, _rx) = mpsc::unbounded_channel();

    let outcome = registry.start_session("s1", 42, 7, "conn-a", tx.clone()).await;
    assert_eq!(outcome, StartOutcome::Created);

    // Grow accumulated state, then start the same id again
    registry.route_transcript(&partial("s1", "hello")).await;
    let outcome = registry.start_session("s1", 42, 7, "conn-a", tx).await;
    assert_eq!(outcome, StartOutcome::AlreadyActive);

    let status = registry.session_status("s1").await.unwrap();
    assert_eq!(status.accumulated_chars, 5, "duplicate start must not reset");
}

#[tokio::test]
async fn test_chunk_routing_grows_accumulated() {
    let registry = SessionRegistry::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    registry.start_session("s1", 42, 7, "conn-a", tx).await;

    registry.route_transcript(&partial("s1", "hello")).await;
    registry.route_transcript(&partial("s1", "world")).await;

    match rx.try_recv().unwrap() {
        ServerMessage::TranscriptionChunk {
            text,
            accumulated_text,
        } => {
            assert_eq!(text.as_deref(), Some("hello"));
            assert_eq!(accumulated_text.as_deref(), Some("hello"));
        }
        other => panic!("unexpected message: {:?}", other),
    }
    match rx.try_recv().unwrap() {
        ServerMessage::TranscriptionChunk {
            accumulated_text, ..
        } => {
            assert_eq!(accumulated_text.as_deref(), Some("hello world"));
        }
        other => panic!("unexpected message: {:?}", other),
    }
}

#[tokio::test]
async fn test_sessions_route_independently() {
    let registry = SessionRegistry::new();
    let (tx_a, mut rx_a) = mpsc::unbounded_channel();
    let (tx_b, mut rx_b) = mpsc::unbounded_channel();
    registry.start_session("s1", 1, 7, "conn-a", tx_a).await;
    registry.start_session("s2", 2, 8, "conn-b", tx_b).await;

    registry.route_transcript(&partial("s2", "only for b")).await;

    assert!(rx_a.try_recv().is_err(), "s1 subscriber must see nothing");
    assert!(matches!(
        rx_b.try_recv().unwrap(),
        ServerMessage::TranscriptionChunk { .. }
    ));
}

#[tokio::test]
async fn test_final_result_completes_and_removes_session() {
    let registry = SessionRegistry::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    registry.start_session("s1", 42, 7, "conn-a", tx).await;
    registry.route_transcript(&partial("s1", "hello")).await;

    let done = registry
        .route_transcript(&final_result("s1", "hello world"))
        .await
        .expect("final result should complete the session");
    assert_eq!(done.meeting_id, 42);
    assert_eq!(done.final_text, "hello world");
    assert!(!registry.contains("s1").await);

    // chunk, then completion
    let _ = rx.try_recv().unwrap();
    match rx.try_recv().unwrap() {
        ServerMessage::TranscriptionCompleted {
            final_text,
            meeting_id,
        } => {
            assert_eq!(final_text.as_deref(), Some("hello world"));
            assert_eq!(meeting_id, Some(42));
        }
        other => panic!("unexpected message: {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_final_text_falls_back_to_accumulated() {
    let registry = SessionRegistry::new();
    let (tx, _rx) = mpsc::unbounded_channel();
    registry.start_session("s1", 42, 7, "conn-a", tx).await;
    registry.route_transcript(&partial("s1", "hello")).await;
    registry.route_transcript(&partial("s1", "world")).await;

    let done = registry
        .route_transcript(&final_result("s1", ""))
        .await
        .unwrap();
    assert_eq!(done.final_text, "hello world");
}

#[tokio::test]
async fn test_transcript_for_unknown_session_is_dropped() {
    let registry = SessionRegistry::new();
    let done = registry.route_transcript(&partial("ghost", "hello")).await;
    assert!(done.is_none());
    assert!(registry.is_empty().await);
}

#[tokio::test]
async fn test_audio_sequence_numbers() {
    let registry = SessionRegistry::new();
    let (tx, _rx) = mpsc::unbounded_channel();
    registry.start_session("s1", 42, 7, "conn-a", tx).await;

    assert_eq!(registry.next_audio_sequence("s1").await, Some(0));
    assert_eq!(registry.next_audio_sequence("s1").await, Some(1));
    assert_eq!(registry.final_sequence("s1").await, Some(2));
    assert_eq!(registry.next_audio_sequence("ghost").await, None);

    let status = registry.session_status("s1").await.unwrap();
    assert_eq!(status.chunks_forwarded, 2);
}

#[tokio::test]
async fn test_close_owned_notifies_remaining_subscribers() {
    let registry = SessionRegistry::new();
    let (tx_owner, _rx_owner) = mpsc::unbounded_channel();
    let (tx_viewer, mut rx_viewer) = mpsc::unbounded_channel();
    registry.start_session("s1", 42, 7, "conn-a", tx_owner).await;
    assert!(registry.subscribe("s1", "conn-b", tx_viewer).await);
    registry.route_transcript(&partial("s1", "hello")).await;

    let closed = registry.close_owned("conn-a").await;
    assert_eq!(closed.len(), 1);
    assert_eq!(closed[0].final_text, "hello");
    assert!(registry.is_empty().await);

    // Viewer saw the chunk, then the close-driven completion
    let _ = rx_viewer.try_recv().unwrap();
    assert!(matches!(
        rx_viewer.try_recv().unwrap(),
        ServerMessage::TranscriptionCompleted { .. }
    ));
}

#[tokio::test]
async fn test_subscribe_to_unknown_session_fails() {
    let registry = SessionRegistry::new();
    let (tx, _rx) = mpsc::unbounded_channel();
    assert!(!registry.subscribe("ghost", "conn-a", tx).await);
}

#[tokio::test]
async fn test_drop_connection_detaches_subscriber() {
    let registry = SessionRegistry::new();
    let (tx_owner, _rx_owner) = mpsc::unbounded_channel();
    let (tx_viewer, mut rx_viewer) = mpsc::unbounded_channel();
    registry.start_session("s1", 42, 7, "conn-a", tx_owner).await;
    registry.subscribe("s1", "conn-b", tx_viewer).await;

    registry.drop_connection("conn-b").await;
    registry.route_transcript(&partial("s1", "hello")).await;

    assert!(rx_viewer.try_recv().is_err());
    assert!(registry.contains("s1").await, "session outlives a viewer");
}

#[tokio::test]
async fn test_live_accumulated_by_meeting() {
    let registry = SessionRegistry::new();
    let (tx, _rx) = mpsc::unbounded_channel();
    registry.start_session("s1", 42, 7, "conn-a", tx).await;
    registry.route_transcript(&partial("s1", "hello")).await;

    assert_eq!(
        registry.live_accumulated(42).await.as_deref(),
        Some("hello")
    );
    assert_eq!(registry.live_accumulated(99).await, None);
}
