//! The two outbound collaborators of the analytics core.
//!
//! - [`NarrativeGenerator`]: turns one chart's series and metrics into a short
//!   narrative comment.
//! - [`AssistantClient`]: answers a user question given a rendered
//!   page-scoped prompt and the prior conversation.
//!
//! Only the request/response contract matters to the core; how the request
//! reaches a language model is up to the implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::ProviderError;
use crate::message::Message;

/// A narrative-generation request for a single chart category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeRequest {
    /// Human-readable chart title, e.g. "Plan Distribution".
    pub chart_type: String,

    /// The chart series.
    pub data: serde_json::Value,

    /// A small summary of key metrics for the chart.
    pub metrics: serde_json::Value,
}

/// An assistant query.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantQuery {
    /// The rendered system prompt for the current page.
    pub prompt: String,

    /// The user's new message.
    pub message: String,

    /// Prior turns, oldest first. Does not include `message`.
    #[serde(default)]
    pub conversation_history: Vec<Message>,
}

#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    /// Produce the narrative comment for one chart.
    async fn generate(&self, request: NarrativeRequest) -> Result<String, ProviderError>;
}

#[async_trait]
pub trait AssistantClient: Send + Sync {
    /// Produce the assistant's reply text.
    async fn query(&self, query: AssistantQuery) -> Result<String, ProviderError>;
}
