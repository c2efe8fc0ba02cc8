use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::{
    app_state::AppState,
    digest::DigestError,
    health::health_check,
    notification::SnsEvent,
};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/notifications", post(receive_notification))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run one digest for the notification in the body.
///
/// Trigger-shape problems are `422` since redelivering the same payload
/// cannot help; every other failure is `500` so the caller may redeliver.
pub async fn receive_notification(
    State(state): State<AppState>,
    Json(event): Json<SnsEvent>,
) -> Response {
    match state.service.handle(event, &state.shutdown).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(error) => {
            let status = match error {
                DigestError::Trigger(_) => StatusCode::UNPROCESSABLE_ENTITY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (
                status,
                Json(ErrorResponse {
                    error: error.to_string(),
                }),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config, digest::DigestService, mail::sender::MockMailSender,
        notification::fixtures, store::MockMessageStore,
    };
    use axum::{body::Body, http::Request};
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;
    use tower::ServiceExt;

    fn create_test_app(store: MockMessageStore, sender: MockMailSender) -> Router {
        let service = DigestService::new(
            Arc::new(Config::new("digest@example.com")),
            Arc::new(store),
            Arc::new(sender),
        )
        .unwrap();
        router(AppState::new(service, CancellationToken::new()))
    }

    fn post_json(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/notifications")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let app = create_test_app(MockMessageStore::new(), MockMailSender::new());
        let request = Request::builder()
            .uri("/healthz")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "OK");
        assert_eq!(json["accepted_languages"], serde_json::json!(["en"]));
    }

    #[tokio::test]
    async fn notification_without_links_sends_empty_digest() {
        let mut store = MockMessageStore::new();
        store
            .expect_load()
            .times(1)
            .returning(|_| Ok(b"Subject: s\r\n\r\nno links today".to_vec()));
        let mut sender = MockMailSender::new();
        sender.expect_send().times(1).returning(|_| Ok(()));

        let app = create_test_app(store, sender);
        let response = app
            .oneshot(post_json(fixtures::event(
                "S3",
                "me@example.com",
                "4 new jobs for Rust",
            )))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["listings"], 0);
        assert_eq!(json["subject"], "Hey: 0 new jobs  for Rust");
        assert_eq!(json["recipient"], "me@example.com");
    }

    #[tokio::test]
    async fn unstored_notification_is_unprocessable() {
        let app = create_test_app(MockMessageStore::new(), MockMailSender::new());
        let response = app
            .oneshot(post_json(fixtures::event("Bounce", "me@example.com", "s")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn store_failure_is_server_error() {
        let mut store = MockMessageStore::new();
        store
            .expect_load()
            .returning(|_| Err(anyhow::anyhow!("bucket unavailable")));
        let mut sender = MockMailSender::new();
        sender.expect_send().times(0);

        let app = create_test_app(store, sender);
        let response = app
            .oneshot(post_json(fixtures::event("S3", "me@example.com", "s")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("bucket unavailable"));
    }
}
