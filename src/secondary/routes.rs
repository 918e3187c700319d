//! C8 (secondary side): the routes a secondary exposes to its primary and to clients.

use super::log::SecondaryLog;
use crate::entry::LogEntry;
use crate::error::ReplicateError;
use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

/// Shared state for the secondary's routes: the log plus the artificial delay used to simulate
/// a slow replica in tests (`spec.md` §4.7, `SECONDARY_DELAY`).
#[derive(Clone)]
pub struct SecondaryState {
    pub log: Arc<SecondaryLog>,
    pub secondary_delay: Duration,
}

pub fn router(state: SecondaryState) -> Router {
    Router::new()
        .route("/replicate", axum::routing::post(replicate))
        .route("/messages", get(list_messages))
        .route("/health", get(health))
        .with_state(state)
}

#[derive(Deserialize)]
struct ReplicateRequest {
    id: Option<u64>,
    message: Option<String>,
    timestamp: Option<f64>,
}

async fn replicate(
    State(state): State<SecondaryState>,
    Json(body): Json<ReplicateRequest>,
) -> Result<impl IntoResponse, ReplicateError> {
    let id = body.id.ok_or(ReplicateError::MissingField("id"))?;
    let message = body.message.ok_or(ReplicateError::MissingField("message"))?;
    let timestamp = body.timestamp.ok_or(ReplicateError::MissingField("timestamp"))?;

    if !state.secondary_delay.is_zero() {
        tokio::time::sleep(state.secondary_delay).await;
    }

    state.log.replicate(LogEntry { id, message, timestamp });
    Ok(Json(json!({ "status": "ack" })))
}

async fn list_messages(State(state): State<SecondaryState>) -> impl IntoResponse {
    Json(state.log.read_all())
}

async fn health() -> impl IntoResponse {
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_state() -> SecondaryState {
        SecondaryState { log: Arc::new(SecondaryLog::new()), secondary_delay: Duration::ZERO }
    }

    #[tokio::test]
    async fn replicate_then_list_round_trips() {
        let app = router(test_state());

        let entry = LogEntry { id: 0, message: "hi".into(), timestamp: 1.0 };
        let req = Request::builder()
            .method("POST")
            .uri("/replicate")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&entry).unwrap()))
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let req = Request::builder().method("GET").uri("/messages").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        let entries: Vec<LogEntry> = serde_json::from_slice(&body).unwrap();
        assert_eq!(entries, vec![entry]);
    }

    #[tokio::test]
    async fn replicate_missing_field_is_bad_request() {
        let app = router(test_state());
        let req = Request::builder()
            .method("POST")
            .uri("/replicate")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"id": 0, "message": "hi"}"#))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn duplicate_replicate_is_idempotent() {
        let app = router(test_state());
        let entry = LogEntry { id: 0, message: "hi".into(), timestamp: 1.0 };
        for _ in 0..2 {
            let req = Request::builder()
                .method("POST")
                .uri("/replicate")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&entry).unwrap()))
                .unwrap();
            let resp = app.clone().oneshot(req).await.unwrap();
            assert_eq!(resp.status(), StatusCode::OK);
        }

        let req = Request::builder().method("GET").uri("/messages").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        let entries: Vec<LogEntry> = serde_json::from_slice(&body).unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn health_always_returns_200() {
        let app = router(test_state());
        let req = Request::builder().method("GET").uri("/health").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
