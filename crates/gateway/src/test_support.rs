//! Shared fixtures for router tests.

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use http_body_util::BodyExt;
use std::sync::Arc;
use trustlens_agent::{LlmAssistant, LlmNarrativeGenerator, ModelSettings, Runtime};
use trustlens_config::AppConfig;
use trustlens_core::error::ProviderError;
use trustlens_core::message::Message;
use trustlens_core::provider::{Provider, ProviderRequest, ProviderResponse};
use trustlens_store::InMemoryStore;

use crate::SharedState;

/// Answers every request with "Mock response", or fails when `fail` is set.
struct MockProvider {
    fail: bool,
}

#[async_trait::async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "gateway_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        if self.fail {
            return Err(ProviderError::ApiError {
                status_code: 500,
                message: "upstream unavailable".into(),
            });
        }
        Ok(ProviderResponse {
            message: Message::assistant("Mock response"),
            usage: None,
            model: request.model,
        })
    }
}

fn runtime(config: AppConfig, fail: bool) -> SharedState {
    let provider: Arc<dyn Provider> = Arc::new(MockProvider { fail });
    let settings = ModelSettings {
        model: "mock-model".into(),
        temperature: 0.7,
        max_tokens: 100,
    };
    Arc::new(Runtime::with_collaborators(
        config,
        Arc::new(InMemoryStore::new()),
        Arc::new(LlmNarrativeGenerator::new(provider.clone(), settings.clone())),
        Arc::new(LlmAssistant::new(provider, settings)),
    ))
}

pub fn test_state() -> SharedState {
    runtime(AppConfig::default(), false)
}

pub fn failing_state() -> SharedState {
    runtime(AppConfig::default(), true)
}

pub fn runtime_with_body_limit(bytes: usize) -> SharedState {
    let mut config = AppConfig::default();
    config.gateway.max_body_bytes = bytes;
    runtime(config, false)
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

/// The two end-to-end sample rows.
pub fn sample_rows() -> serde_json::Value {
    serde_json::json!([
        {
            "Cert Number": 1001,
            "Plan Name": "Test Plan 1",
            "Status": "Active",
            "Payment Method": "Cash",
            "New IC": "901212012345",
            "Outst Cont": 1000,
            "Cont Installment": 500
        },
        {
            "Cert Number": 1002,
            "Plan Name": "Test Plan 2",
            "Status": "Active",
            "Payment Method": "Bank Transfer",
            "New IC": "920415023456",
            "Outst Cont": 1500,
            "Cont Installment": 750
        }
    ])
}
