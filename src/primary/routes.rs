//! C8 (primary side): the three HTTP routes the primary exposes to clients.

use super::quorum::has_quorum;
use super::Replicator;
use crate::error::AppendError;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

pub fn router(replicator: Arc<Replicator>) -> Router {
    Router::new()
        .route("/messages", post(append).get(list_messages))
        .route("/health", get(health))
        .with_state(replicator)
}

#[derive(Deserialize)]
struct AppendRequest {
    message: Option<String>,
    write_concern: Option<u32>,
}

async fn append(
    State(replicator): State<Arc<Replicator>>,
    Json(body): Json<AppendRequest>,
) -> Result<impl IntoResponse, AppendError> {
    let entry = replicator.handle_append(body.message, body.write_concern).await?;
    Ok((StatusCode::CREATED, Json(json!({ "status": "ok", "entry": entry }))))
}

async fn list_messages(State(replicator): State<Arc<Replicator>>) -> impl IntoResponse {
    Json(replicator.read_all())
}

async fn health(State(replicator): State<Arc<Replicator>>) -> impl IntoResponse {
    let secondaries: HashMap<String, super::health::Health> =
        replicator.secondary_health().into_iter().collect();
    let healthy_count =
        secondaries.values().filter(|h| **h == super::health::Health::Healthy).count();
    let quorum = has_quorum(secondaries.len(), healthy_count);
    Json(json!({ "status": "ok", "secondaries": secondaries, "quorum": quorum }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PrimaryConfig;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use std::time::Duration;
    use tower::ServiceExt;

    fn test_config() -> PrimaryConfig {
        PrimaryConfig {
            port: 0,
            secondaries: vec![],
            replication_timeout: Duration::from_secs(1),
            heartbeat_interval: Duration::from_secs(1),
            heartbeat_timeout: Duration::from_secs(1),
            suspected_threshold: 2,
            unhealthy_threshold: 5,
        }
    }

    #[tokio::test]
    async fn post_messages_then_get_messages_round_trips() {
        let replicator = Replicator::spawn(test_config());
        let app = router(replicator);

        let post_req = Request::builder()
            .method("POST")
            .uri("/messages")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"message": "hello"}"#))
            .unwrap();
        let resp = app.clone().oneshot(post_req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let get_req = Request::builder().method("GET").uri("/messages").body(Body::empty()).unwrap();
        let resp = app.oneshot(get_req).await.unwrap();
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        let entries: Vec<crate::entry::LogEntry> = serde_json::from_slice(&body).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message, "hello");
    }

    #[tokio::test]
    async fn post_without_message_is_bad_request() {
        let replicator = Replicator::spawn(test_config());
        let app = router(replicator);

        let req = Request::builder()
            .method("POST")
            .uri("/messages")
            .header("content-type", "application/json")
            .body(Body::from(r#"{}"#))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn health_lists_no_secondaries_for_a_single_node_cluster() {
        let replicator = Replicator::spawn(test_config());
        let app = router(replicator);
        let req = Request::builder().method("GET").uri("/health").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["secondaries"].as_object().unwrap().len(), 0);
        assert_eq!(value["quorum"], true);
    }
}
