//! HTTP API gateway for trustlens.
//!
//! Two surfaces share one [`Runtime`]:
//!
//! - `/api/*`: the stateless collaborator endpoints the dashboard front end
//!   calls (chart comments and chat)
//! - `/v1/*`: the roster, dashboard, client and assistant resources
//!
//! Built on Axum.

pub mod api_v1;

#[cfg(test)]
pub(crate) mod test_support;

use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    extract::State,
    http::{HeaderValue, Method, StatusCode, header},
    response::Json,
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{error, info, warn};

use trustlens_agent::Runtime;
use trustlens_core::{AssistantQuery, NarrativeRequest};

pub type SharedState = Arc<Runtime>;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub(crate) type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Build the full router.
///
/// Layers applied:
/// - CORS restricted to the configured front-end origin
/// - Request body size limit from `gateway.max_body_bytes`
/// - HTTP trace logging
pub fn build_router(state: SharedState) -> Router {
    let gateway = &state.config().gateway;
    let cors = cors_layer(&gateway.allowed_origin);
    let body_limit = DefaultBodyLimit::max(gateway.max_body_bytes);

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/generate-chart-comment", post(chart_comment_handler))
        .route("/api/chat", post(chat_handler))
        .with_state(state.clone())
        .nest("/v1", api_v1::v1_router(state))
        .layer(body_limit)
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));
    match HeaderValue::from_str(origin) {
        Ok(value) => layer.allow_origin(AllowOrigin::exact(value)),
        Err(e) => {
            warn!(origin = %origin, error = %e, "Ignoring invalid allowed origin");
            layer
        }
    }
}

/// Start the gateway HTTP server.
pub async fn start(runtime: Runtime) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", runtime.config().gateway.host, runtime.config().gateway.port);
    let app = build_router(Arc::new(runtime));

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct CommentResponse {
    comment: String,
}

async fn chart_comment_handler(
    State(state): State<SharedState>,
    Json(payload): Json<NarrativeRequest>,
) -> Result<Json<CommentResponse>, ApiError> {
    info!(chart_type = %payload.chart_type, "Chart comment request");
    let timeout = Duration::from_secs(state.config().narrative.timeout_secs);

    match tokio::time::timeout(timeout, state.generator().generate(payload)).await {
        Ok(Ok(comment)) => Ok(Json(CommentResponse { comment })),
        Ok(Err(e)) => {
            error!(error = %e, "Chart comment generation failed");
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to generate comment",
            ))
        }
        Err(_) => {
            error!("Chart comment generation timed out");
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to generate comment",
            ))
        }
    }
}

#[derive(Serialize)]
struct ChatResponse {
    response: String,
}

async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<AssistantQuery>,
) -> Result<Json<ChatResponse>, ApiError> {
    info!(
        message_len = payload.message.len(),
        history = payload.conversation_history.len(),
        "Chat request"
    );
    let timeout = Duration::from_secs(state.config().assistant.timeout_secs);

    match tokio::time::timeout(timeout, state.assistant().query(payload)).await {
        Ok(Ok(response)) => Ok(Json(ChatResponse { response })),
        Ok(Err(e)) => {
            error!(error = %e, "Chat request failed");
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to process chat request",
            ))
        }
        Err(_) => {
            error!("Chat request timed out");
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to process chat request",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{body_json, failing_state, json_request, test_state};
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_endpoint() {
        let app = build_router(test_state());

        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn chart_comment_returns_model_text() {
        let app = build_router(test_state());
        let req = json_request(
            "POST",
            "/api/generate-chart-comment",
            serde_json::json!({
                "chartType": "Plan Distribution",
                "data": [{"name": "Test Plan 1", "value": 1}],
                "metrics": {"totalClients": 1}
            }),
        );

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["comment"], "Mock response");
    }

    #[tokio::test]
    async fn chart_comment_failure_is_500() {
        let app = build_router(failing_state());
        let req = json_request(
            "POST",
            "/api/generate-chart-comment",
            serde_json::json!({"chartType": "Age Distribution", "data": [], "metrics": {}}),
        );

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Failed to generate comment");
    }

    #[tokio::test]
    async fn chat_accepts_history_without_ids() {
        let app = build_router(test_state());
        let req = json_request(
            "POST",
            "/api/chat",
            serde_json::json!({
                "prompt": "You are an AI assistant",
                "message": "How many clients?",
                "conversationHistory": [
                    {"role": "user", "content": "hi"},
                    {"role": "assistant", "content": "hello"}
                ]
            }),
        );

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["response"], "Mock response");
    }

    #[tokio::test]
    async fn chat_failure_is_500() {
        let app = build_router(failing_state());
        let req = json_request(
            "POST",
            "/api/chat",
            serde_json::json!({"prompt": "p", "message": "m"}),
        );

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Failed to process chat request");
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let runtime = crate::test_support::runtime_with_body_limit(64);
        let app = build_router(runtime);
        let req = json_request(
            "POST",
            "/api/chat",
            serde_json::json!({"prompt": "p".repeat(256), "message": "m"}),
        );

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
