use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use embedder::services::{EmbedResponse, ErrorResponse, HealthResponse, ServiceError};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// `ServiceError` rendered as `{"error": "..."}` with the matching status.
pub struct ApiError(ServiceError);

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            ServiceError::BadRequest(message) => {
                tracing::warn!("Rejected embed request: {}", message);
                error_response(StatusCode::BAD_REQUEST, message)
            },
            ServiceError::InferenceFailure(message) => {
                tracing::error!("Embedding failed: {}", message);
                error_response(StatusCode::INTERNAL_SERVER_ERROR, message)
            },
        }
    }
}

fn error_response(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorResponse { error })).into_response()
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(state.embed_service.health())
}

// The body is taken as raw bytes so malformed JSON maps to our own 400
// instead of axum's `Json` rejection.
async fn embed(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<EmbedResponse>, ApiError> {
    let response = state.embed_service.handle(&body).await?;
    Ok(Json(response))
}

pub fn build_router(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/embed", post(embed))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use embedder::testing::{FailingEmbedding, TestEmbedding};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> Router {
        build_router(AppState::new(Arc::new(TestEmbedding)), 2 * 1024 * 1024)
    }

    async fn send(app: Router, method: Method, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn post_embed(app: Router, body: &str) -> (StatusCode, Value) {
        send(app, Method::POST, "/embed", body).await
    }

    #[tokio::test]
    async fn embed_batch_returns_200() {
        let (status, body) = post_embed(app(), r#"{"texts": ["a", "b"]}"#).await;
        assert_eq!(status, StatusCode::OK);
        let embeddings = body["embeddings"].as_array().unwrap();
        assert_eq!(embeddings.len(), 2);
        assert_eq!(embeddings[0].as_array().unwrap().len(), 384);
    }

    #[tokio::test]
    async fn single_string_equals_wrapped_string() {
        let (_, single) = post_embed(app(), r#"{"texts": "hello world"}"#).await;
        let (_, wrapped) = post_embed(app(), r#"{"texts": ["hello world"]}"#).await;
        assert_eq!(single["embeddings"].as_array().unwrap().len(), 1);
        assert_eq!(single, wrapped);
    }

    #[tokio::test]
    async fn empty_batch_returns_empty_list() {
        let (status, body) = post_embed(app(), r#"{"texts": []}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"embeddings": []}));
    }

    #[tokio::test]
    async fn missing_texts_returns_400() {
        let (status, body) = post_embed(app(), r#"{"sentences": ["a"]}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "No texts provided"}));
    }

    #[tokio::test]
    async fn malformed_json_returns_400() {
        let (status, body) = post_embed(app(), r#"{"texts": ["a""#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "No texts provided"}));
    }

    #[tokio::test]
    async fn empty_body_returns_400() {
        let (status, body) = post_embed(app(), "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "No texts provided"}));
    }

    #[tokio::test]
    async fn non_string_element_returns_500() {
        let (status, body) = post_embed(app(), r#"{"texts": ["a", null]}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "texts[1] must be a string, found null"}));
    }

    #[tokio::test]
    async fn model_failure_returns_500() {
        let app = build_router(
            AppState::new(Arc::new(FailingEmbedding::new("tensor shape mismatch"))),
            1024,
        );
        let (status, body) = post_embed(app, r#"{"texts": ["a"]}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "tensor shape mismatch"}));
    }

    #[tokio::test]
    async fn server_keeps_serving_after_errors() {
        let app = app();
        let (status, _) = post_embed(app.clone(), "garbage").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = post_embed(app.clone(), r#"{"texts": [42]}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let (status, body) = post_embed(app, r#"{"texts": ["still alive"]}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["embeddings"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let app = build_router(AppState::new(Arc::new(TestEmbedding)), 16);
        let body = r#"{"texts": ["far too long for the limit"]}"#;
        let (status, _) = post_embed(app, body).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn health_reports_model() {
        let (status, body) = send(app(), Method::GET, "/health", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"status": "ok", "model": "test-embedding-model", "dimensions": 384})
        );
    }

    #[tokio::test]
    async fn get_embed_is_method_not_allowed() {
        let (status, _) = send(app(), Method::GET, "/embed", "").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }
}
