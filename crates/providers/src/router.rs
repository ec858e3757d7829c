//! Provider router: builds and selects LLM providers from config.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use trustlens_config::AppConfig;
use trustlens_core::provider::Provider;

use crate::fallback::FallbackProvider;
use crate::openai_compat::OpenAiCompatProvider;

/// Routes LLM requests to the correct provider.
pub struct ProviderRouter {
    providers: HashMap<String, Arc<dyn Provider>>,
    default_provider: String,
    fallbacks: Vec<String>,
    timeouts: HashMap<String, Duration>,
}

impl ProviderRouter {
    pub fn new(default_provider: impl Into<String>) -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider.into(),
            fallbacks: Vec::new(),
            timeouts: HashMap::new(),
        }
    }

    /// Register a provider.
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn Provider>) {
        self.providers.insert(name.into(), provider);
    }

    /// Providers to try, in order, after the default one.
    pub fn with_fallbacks(mut self, fallbacks: Vec<String>) -> Self {
        self.fallbacks = fallbacks;
        self
    }

    pub fn set_timeout(&mut self, name: impl Into<String>, timeout: Duration) {
        self.timeouts.insert(name.into(), timeout);
    }

    /// Get the default provider.
    pub fn default(&self) -> Option<Arc<dyn Provider>> {
        self.providers.get(&self.default_provider).cloned()
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(name).cloned()
    }

    /// The provider the rest of the runtime should talk to.
    ///
    /// With no fallbacks this is the default provider itself; otherwise a
    /// [`FallbackProvider`] over the default followed by each registered
    /// fallback. Unknown fallback names are skipped with a warning.
    pub fn primary(&self) -> Option<Arc<dyn Provider>> {
        let default = self.default()?;
        if self.fallbacks.is_empty() {
            return Some(default);
        }

        let mut chain =
            FallbackProvider::new("fallback").add(default, self.timeout_for(&self.default_provider));
        for name in &self.fallbacks {
            match self.get(name) {
                Some(provider) => chain = chain.add(provider, self.timeout_for(name)),
                None => tracing::warn!(provider = %name, "Fallback provider is not configured, skipping"),
            }
        }
        Some(Arc::new(chain))
    }

    fn timeout_for(&self, name: &str) -> Duration {
        self.timeouts
            .get(name)
            .copied()
            .unwrap_or(Duration::from_secs(120))
    }
}

/// Build providers from configuration.
pub fn build_from_config(config: &AppConfig) -> ProviderRouter {
    let mut router =
        ProviderRouter::new(&config.default_provider).with_fallbacks(config.fallbacks.clone());

    for (name, provider_config) in &config.providers {
        let api_key = provider_config
            .api_key
            .clone()
            .or_else(|| config.api_key.clone())
            .unwrap_or_default();

        let base_url = provider_config
            .api_url
            .clone()
            .unwrap_or_else(|| default_base_url(name));

        let timeout = Duration::from_secs(provider_config.timeout_secs);
        let provider = OpenAiCompatProvider::with_timeout(name, &base_url, &api_key, timeout);
        router.register(name.clone(), Arc::new(provider));
        router.set_timeout(name.clone(), timeout);
    }

    // Ensure the default provider exists (even if not explicitly configured)
    if router.get(&config.default_provider).is_none() {
        let api_key = config.api_key.clone().unwrap_or_default();
        let base_url = default_base_url(&config.default_provider);
        router.register(
            config.default_provider.clone(),
            Arc::new(OpenAiCompatProvider::new(
                &config.default_provider,
                &base_url,
                &api_key,
            )),
        );
    }

    router
}

/// Get the default base URL for well-known providers.
fn default_base_url(provider_name: &str) -> String {
    match provider_name {
        "openai" => "https://api.openai.com/v1".into(),
        "openrouter" => "https://openrouter.ai/api/v1".into(),
        "ollama" => "http://localhost:11434/v1".into(),
        "deepseek" => "https://api.deepseek.com/v1".into(),
        "groq" => "https://api.groq.com/openai/v1".into(),
        "together" => "https://api.together.xyz/v1".into(),
        "vllm" => "http://localhost:8000/v1".into(),
        _ => format!("https://{provider_name}.api.example.com/v1"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trustlens_config::ProviderConfig;

    #[test]
    fn router_register_and_lookup() {
        let mut router = ProviderRouter::new("openai");
        router.register("openai", Arc::new(OpenAiCompatProvider::openai("sk-test")));

        assert!(router.get("openai").is_some());
        assert!(router.get("nonexistent").is_none());
        assert!(router.default().is_some());
    }

    #[test]
    fn default_base_urls() {
        assert!(default_base_url("openai").contains("api.openai.com"));
        assert!(default_base_url("openrouter").contains("openrouter.ai"));
        assert!(default_base_url("ollama").contains("localhost:11434"));
    }

    #[test]
    fn build_from_default_config() {
        let router = build_from_config(&AppConfig::default());
        assert_eq!(router.providers.len(), 1);
        assert!(router.get("openai").is_some());
        let primary = router.primary().unwrap();
        assert_eq!(primary.name(), "openai");
    }

    #[test]
    fn fallbacks_wrap_the_default() {
        let mut config = AppConfig::default();
        config.fallbacks = vec!["openrouter".into(), "missing".into()];
        config.providers.insert(
            "openrouter".into(),
            ProviderConfig {
                api_key: Some("sk-or".into()),
                api_url: None,
                timeout_secs: 15,
            },
        );

        let router = build_from_config(&config);
        assert_eq!(router.providers.len(), 2);
        assert!(router.get("openrouter").is_some());
        assert_eq!(router.timeout_for("openrouter"), Duration::from_secs(15));
        assert_eq!(router.primary().unwrap().name(), "fallback");
    }
}
