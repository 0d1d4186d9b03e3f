use axum::body::Body;
use axum::http::{Request, StatusCode};
use dealcoach_relay::{create_router, transcript_key, AppState, MemoryStt, SttBackend};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn test_state() -> AppState {
    let backend: Arc<dyn SttBackend> = Arc::new(MemoryStt::new());
    AppState::new(backend, Duration::from_secs(60))
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let router = create_router(test_state());
    let response = router
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_session_status_is_404() {
    let router = create_router(test_state());
    let response = router
        .oneshot(
            Request::builder()
                .uri("/sessions/ghost/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_string(response).await.contains("not found"));
}

#[tokio::test]
async fn test_session_status_for_live_session() {
    let state = test_state();
    let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
    state.registry.start_session("s1", 42, 7, "conn-a", tx).await;

    let router = create_router(state);
    let response = router
        .oneshot(
            Request::builder()
                .uri("/sessions/s1/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert!(body.contains("\"session_id\":\"s1\""));
    assert!(body.contains("\"meeting_id\":42"));
    assert!(body.contains("\"is_transcribing\":true"));
}

#[tokio::test]
async fn test_transcript_served_from_cache() {
    let state = test_state();
    state
        .cache
        .set(&transcript_key(42), "hello world".into())
        .await;

    let router = create_router(state);
    let response = router
        .oneshot(
            Request::builder()
                .uri("/meetings/42/transcript")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert!(body.contains("hello world"));
    assert!(body.contains("\"live\":false"));
}

#[tokio::test]
async fn test_transcript_missing_is_404() {
    let router = create_router(test_state());
    let response = router
        .oneshot(
            Request::builder()
                .uri("/meetings/42/transcript")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
