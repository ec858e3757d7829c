//! Provider fallback: ordered retry chain with per-provider timeouts.
//!
//! When a provider fails (timeout, rate limit, error), the next provider in
//! the chain is tried. The last error is returned when every entry fails.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use trustlens_core::Provider;
use trustlens_core::error::ProviderError;
use trustlens_core::provider::*;

/// A provider that wraps an ordered list of providers and falls back on failure.
pub struct FallbackProvider {
    name: String,
    chain: Vec<FallbackEntry>,
}

struct FallbackEntry {
    provider: Arc<dyn Provider>,
    timeout: Duration,
}

impl FallbackProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            chain: Vec::new(),
        }
    }

    /// Add a provider to the chain with its own timeout.
    pub fn add(mut self, provider: Arc<dyn Provider>, timeout: Duration) -> Self {
        self.chain.push(FallbackEntry { provider, timeout });
        self
    }

    /// Add a provider with the default timeout (120s).
    pub fn add_default(self, provider: Arc<dyn Provider>) -> Self {
        self.add(provider, Duration::from_secs(120))
    }
}

#[async_trait]
impl Provider for FallbackProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        let mut last_error = ProviderError::NotConfigured("No providers in fallback chain".into());

        for (i, entry) in self.chain.iter().enumerate() {
            let provider_name = entry.provider.name();

            info!(
                provider = %provider_name,
                attempt = i + 1,
                total = self.chain.len(),
                "Fallback: trying provider"
            );

            match tokio::time::timeout(entry.timeout, entry.provider.complete(request.clone()))
                .await
            {
                Ok(Ok(response)) => return Ok(response),
                Ok(Err(e)) => {
                    warn!(
                        provider = %provider_name,
                        error = %e,
                        "Fallback: provider failed, trying next"
                    );
                    last_error = e;
                }
                Err(_) => {
                    warn!(
                        provider = %provider_name,
                        timeout_secs = entry.timeout.as_secs(),
                        "Fallback: provider timed out, trying next"
                    );
                    last_error = ProviderError::Timeout(format!(
                        "Provider '{}' timed out after {}s",
                        provider_name,
                        entry.timeout.as_secs()
                    ));
                }
            }
        }

        Err(last_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use trustlens_core::message::Message;

    struct ScriptedProvider {
        name: String,
        outcome: Result<String, ProviderError>,
        call_count: Mutex<usize>,
    }

    impl ScriptedProvider {
        fn ok(name: &str, reply: &str) -> Self {
            Self::with(name, Ok(reply.into()))
        }

        fn failing(name: &str, error: ProviderError) -> Self {
            Self::with(name, Err(error))
        }

        fn with(name: &str, outcome: Result<String, ProviderError>) -> Self {
            Self {
                name: name.into(),
                outcome,
                call_count: Mutex::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.call_count.lock().unwrap()
        }
    }

    #[async_trait]
    impl Provider for ScriptedProvider {
        fn name(&self) -> &str {
            &self.name
        }

        async fn complete(
            &self,
            request: ProviderRequest,
        ) -> std::result::Result<ProviderResponse, ProviderError> {
            *self.call_count.lock().unwrap() += 1;
            let text = self.outcome.clone()?;
            Ok(ProviderResponse {
                message: Message::assistant(text),
                usage: None,
                model: request.model,
            })
        }
    }

    /// Never answers.
    struct HangingProvider;

    #[async_trait]
    impl Provider for HangingProvider {
        fn name(&self) -> &str {
            "hanging"
        }

        async fn complete(
            &self,
            _request: ProviderRequest,
        ) -> std::result::Result<ProviderResponse, ProviderError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(ProviderError::EmptyResponse)
        }
    }

    fn test_request() -> ProviderRequest {
        ProviderRequest::new("test", vec![Message::user("hello")])
    }

    #[tokio::test]
    async fn first_provider_succeeds() {
        let p1 = Arc::new(ScriptedProvider::ok("primary", "one"));
        let p2 = Arc::new(ScriptedProvider::ok("secondary", "two"));

        let fallback = FallbackProvider::new("chain")
            .add_default(p1.clone())
            .add_default(p2.clone());

        let response = fallback.complete(test_request()).await.unwrap();
        assert_eq!(response.message.content, "one");
        assert_eq!(p1.calls(), 1);
        assert_eq!(p2.calls(), 0);
    }

    #[tokio::test]
    async fn falls_back_on_rate_limit() {
        let p1 = Arc::new(ScriptedProvider::failing(
            "primary",
            ProviderError::RateLimited { retry_after_secs: 60 },
        ));
        let p2 = Arc::new(ScriptedProvider::ok("secondary", "two"));

        let fallback = FallbackProvider::new("chain")
            .add_default(p1.clone())
            .add_default(p2.clone());

        let response = fallback.complete(test_request()).await.unwrap();
        assert_eq!(response.message.content, "two");
        assert_eq!(p1.calls(), 1);
        assert_eq!(p2.calls(), 1);
    }

    #[tokio::test]
    async fn all_providers_fail_returns_last_error() {
        let p1 = Arc::new(ScriptedProvider::failing(
            "primary",
            ProviderError::Network("conn refused".into()),
        ));
        let p2 = Arc::new(ScriptedProvider::failing(
            "secondary",
            ProviderError::AuthenticationFailed("bad key".into()),
        ));

        let fallback = FallbackProvider::new("chain").add_default(p1).add_default(p2);

        match fallback.complete(test_request()).await {
            Err(ProviderError::AuthenticationFailed(_)) => {}
            other => panic!("Expected AuthenticationFailed, got: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_triggers_fallback() {
        let p2 = Arc::new(ScriptedProvider::ok("secondary", "two"));

        let fallback = FallbackProvider::new("chain")
            .add(Arc::new(HangingProvider), Duration::from_secs(5))
            .add_default(p2.clone());

        let response = fallback.complete(test_request()).await.unwrap();
        assert_eq!(response.message.content, "two");
        assert_eq!(p2.calls(), 1);
    }

    #[tokio::test]
    async fn empty_chain_returns_not_configured() {
        let fallback = FallbackProvider::new("empty");
        assert!(fallback.chain.is_empty());
        assert!(matches!(
            fallback.complete(test_request()).await,
            Err(ProviderError::NotConfigured(_))
        ));
    }
}
