//! Health check and status endpoints

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde_json::json;

use crate::api::server::AppState;

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "timestamp": Utc::now(),
        })),
    )
}

/// Broadcast status: connected viewers and the latest sample time
pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    let scheduler = &state.scheduler;

    Json(json!({
        "status": "ok",
        "viewers": scheduler.viewer_count(),
        "uptime_secs": state.started_at.elapsed().as_secs(),
        "broadcast_interval_ms": scheduler.period().as_millis() as u64,
        "latest_timestamp": scheduler.latest().map(|s| s.timestamp),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::routes::create_router;
    use crate::broadcast::scheduler::tests::SequenceGenerator;
    use crate::broadcast::BroadcastScheduler;
    use crate::models::ConnectionId;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use std::sync::Arc;
    use std::time::{Duration, Instant};
    use tokio::sync::mpsc;
    use tower::ServiceExt;

    fn app_state() -> AppState {
        AppState {
            scheduler: Arc::new(BroadcastScheduler::new(
                Box::new(SequenceGenerator::default()),
                Duration::from_millis(2000),
            )),
            started_at: Instant::now(),
        }
    }

    async fn get_json(state: AppState, uri: &str) -> (StatusCode, Value) {
        let response = create_router(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_health_check() {
        let (status, body) = get_json(app_state(), "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        let ts = body["timestamp"].as_str().unwrap();
        assert!(ts.parse::<chrono::DateTime<Utc>>().is_ok());
    }

    #[tokio::test]
    async fn test_status_before_any_broadcast() {
        let (status, body) = get_json(app_state(), "/api/status").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["viewers"], 0);
        assert_eq!(body["broadcast_interval_ms"], 2000);
        assert!(body["latest_timestamp"].is_null());
    }

    #[tokio::test]
    async fn test_status_reports_viewers_and_latest() {
        let state = app_state();
        let (tx, _rx) = mpsc::channel(4);
        state.scheduler.join(ConnectionId::new(), tx).unwrap();

        let (_, body) = get_json(state, "/api/status").await;

        assert_eq!(body["viewers"], 1);
        assert!(body["latest_timestamp"].is_string());
    }
}
