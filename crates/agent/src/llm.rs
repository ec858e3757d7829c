//! Language-model implementations of the two collaborator traits.
//!
//! Both wrap any [`Provider`], so the fallback chain and the provider router
//! apply to narratives and assistant replies alike.

use async_trait::async_trait;
use std::sync::Arc;
use trustlens_core::error::ProviderError;
use trustlens_core::message::Message;
use trustlens_core::provider::{Provider, ProviderRequest};
use trustlens_core::{AssistantClient, AssistantQuery, NarrativeGenerator, NarrativeRequest};

const ANALYST_SYSTEM_PROMPT: &str = "You are a professional data analyst providing insights about \
trust management data. Keep responses concise and focused on business implications.";

/// Returned when the model answers a narrative request with nothing.
pub const NO_INSIGHT: &str = "No insight available.";

/// Returned when the model answers an assistant query with nothing.
pub const EMPTY_REPLY: &str = "I apologize, but I couldn't generate a response.";

/// Model parameters shared by both collaborators.
#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl ModelSettings {
    fn request(&self, messages: Vec<Message>) -> ProviderRequest {
        ProviderRequest::new(self.model.clone(), messages)
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens)
    }
}

fn narrative_prompt(request: &NarrativeRequest) -> String {
    format!(
        "As a data analyst, provide a concise and insightful comment about the following chart data:\n\
         Chart Type: {}\n\
         Data: {}\n\
         Key Metrics: {}\n\n\
         Generate a brief, professional comment (max 2 sentences) that:\n\
         1. Highlights the most significant insight\n\
         2. Provides actionable business implications\n\
         3. Uses precise numbers and percentages where relevant\n\n\
         Keep the tone professional and analytical. Focus on the most important trends or patterns.",
        request.chart_type, request.data, request.metrics,
    )
}

/// Chart narratives from a chat-completion provider.
pub struct LlmNarrativeGenerator {
    provider: Arc<dyn Provider>,
    settings: ModelSettings,
}

impl LlmNarrativeGenerator {
    pub fn new(provider: Arc<dyn Provider>, settings: ModelSettings) -> Self {
        Self { provider, settings }
    }
}

#[async_trait]
impl NarrativeGenerator for LlmNarrativeGenerator {
    async fn generate(&self, request: NarrativeRequest) -> Result<String, ProviderError> {
        let messages = vec![
            Message::system(ANALYST_SYSTEM_PROMPT),
            Message::user(narrative_prompt(&request)),
        ];
        let response = self.provider.complete(self.settings.request(messages)).await?;
        let text = response.message.content.trim();
        if text.is_empty() {
            return Ok(NO_INSIGHT.to_string());
        }
        Ok(text.to_string())
    }
}

/// Assistant replies from a chat-completion provider.
///
/// The rendered page prompt goes first as the system message, then the
/// prior conversation, then the new user message.
pub struct LlmAssistant {
    provider: Arc<dyn Provider>,
    settings: ModelSettings,
}

impl LlmAssistant {
    pub fn new(provider: Arc<dyn Provider>, settings: ModelSettings) -> Self {
        Self { provider, settings }
    }
}

#[async_trait]
impl AssistantClient for LlmAssistant {
    async fn query(&self, query: AssistantQuery) -> Result<String, ProviderError> {
        let mut messages = Vec::with_capacity(query.conversation_history.len() + 2);
        messages.push(Message::system(query.prompt));
        messages.extend(query.conversation_history);
        messages.push(Message::user(query.message));

        tracing::debug!(
            provider = self.provider.name(),
            messages = messages.len(),
            "Querying assistant"
        );
        let response = self.provider.complete(self.settings.request(messages)).await?;
        if response.message.content.trim().is_empty() {
            return Ok(EMPTY_REPLY.to_string());
        }
        Ok(response.message.content)
    }
}
