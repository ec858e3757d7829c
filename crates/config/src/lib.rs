//! Configuration loading, validation, and management for trustlens.
//!
//! Loads configuration from `~/.trustlens/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.trustlens/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default LLM provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Default model
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Default temperature
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Providers tried, in order, after the default one fails
    #[serde(default)]
    pub fallbacks: Vec<String>,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    /// Persistence configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Roster analytics configuration
    #[serde(default)]
    pub analytics: AnalyticsConfig,

    /// Chart narrative configuration
    #[serde(default)]
    pub narrative: NarrativeConfig,

    /// Conversational assistant configuration
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,
}

fn default_provider() -> String {
    "openai".into()
}
fn default_model() -> String {
    "gpt-3.5-turbo".into()
}
fn default_temperature() -> f32 {
    0.7
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("fallbacks", &self.fallbacks)
            .field("providers", &self.providers)
            .field("store", &self.store)
            .field("analytics", &self.analytics)
            .field("narrative", &self.narrative)
            .field("assistant", &self.assistant)
            .field("gateway", &self.gateway)
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Per-provider timeout inside the fallback chain
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
}

fn default_provider_timeout() -> u64 {
    120
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// "file" or "memory"
    #[serde(default = "default_store_backend")]
    pub backend: String,

    /// Directory for the file backend (default: ~/.trustlens/store)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

fn default_store_backend() -> String {
    "file".into()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            path: None,
        }
    }
}

impl StoreConfig {
    /// The directory the file backend writes to.
    pub fn resolved_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| AppConfig::config_dir().join("store"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Two-digit identity-code years up to and including this value are
    /// read as 20xx, the rest as 19xx.
    #[serde(default = "default_century_cutoff")]
    pub century_cutoff: u8,

    /// Vendor prefixes stripped from plan names before tallying
    #[serde(default = "default_plan_name_prefixes")]
    pub plan_name_prefixes: Vec<String>,

    /// Rows per page in the client list
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_century_cutoff() -> u8 {
    23
}
fn default_plan_name_prefixes() -> Vec<String> {
    vec!["PruBSN".into()]
}
fn default_page_size() -> usize {
    10
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            century_cutoff: default_century_cutoff(),
            plan_name_prefixes: default_plan_name_prefixes(),
            page_size: default_page_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrativeConfig {
    #[serde(default = "default_narrative_max_tokens")]
    pub max_tokens: u32,

    /// Bound on each category request; expiry takes the fallback path
    #[serde(default = "default_narrative_timeout")]
    pub timeout_secs: u64,

    /// "sequential" (one category at a time) or "concurrent"
    #[serde(default = "default_narrative_strategy")]
    pub strategy: String,
}

fn default_narrative_max_tokens() -> u32 {
    100
}
fn default_narrative_timeout() -> u64 {
    30
}
fn default_narrative_strategy() -> String {
    "sequential".into()
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_narrative_max_tokens(),
            timeout_secs: default_narrative_timeout(),
            strategy: default_narrative_strategy(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    #[serde(default = "default_assistant_max_tokens")]
    pub max_tokens: u32,

    /// Bound on each assistant query; expiry yields the apology message
    #[serde(default = "default_assistant_timeout")]
    pub timeout_secs: u64,
}

fn default_assistant_max_tokens() -> u32 {
    500
}
fn default_assistant_timeout() -> u64 {
    60
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_assistant_max_tokens(),
            timeout_secs: default_assistant_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// Origin of the dashboard front end allowed by CORS
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,

    /// Request body limit; roster uploads can be large
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_port() -> u16 {
    5000
}
fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_allowed_origin() -> String {
    "http://localhost:3000".into()
}
fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            allowed_origin: default_allowed_origin(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.trustlens/config.toml).
    ///
    /// Also checks environment variables for API keys:
    /// - `TRUSTLENS_API_KEY` (highest priority)
    /// - `OPENAI_API_KEY`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env();
        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env(&mut self) {
        if self.api_key.is_none() {
            self.api_key = std::env::var("TRUSTLENS_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }

        if let Ok(provider) = std::env::var("TRUSTLENS_PROVIDER") {
            self.default_provider = provider;
        }

        if let Ok(model) = std::env::var("TRUSTLENS_MODEL") {
            self.default_model = model;
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".trustlens")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_temperature < 0.0 || self.default_temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.analytics.century_cutoff > 99 {
            return Err(ConfigError::ValidationError(
                "analytics.century_cutoff must be a two-digit year (0-99)".into(),
            ));
        }

        if self.analytics.page_size == 0 {
            return Err(ConfigError::ValidationError(
                "analytics.page_size must be > 0".into(),
            ));
        }

        if !matches!(self.store.backend.as_str(), "file" | "memory") {
            return Err(ConfigError::ValidationError(format!(
                "unknown store backend '{}' (expected \"file\" or \"memory\")",
                self.store.backend
            )));
        }

        if !matches!(self.narrative.strategy.as_str(), "sequential" | "concurrent") {
            return Err(ConfigError::ValidationError(format!(
                "unknown narrative strategy '{}' (expected \"sequential\" or \"concurrent\")",
                self.narrative.strategy
            )));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
            || self
                .providers
                .get(&self.default_provider)
                .is_some_and(|p| p.api_key.is_some())
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            fallbacks: vec![],
            providers: HashMap::new(),
            store: StoreConfig::default(),
            analytics: AnalyticsConfig::default(),
            narrative: NarrativeConfig::default(),
            assistant: AssistantConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_provider, "openai");
        assert_eq!(config.gateway.port, 5000);
        assert_eq!(config.analytics.century_cutoff, 23);
        assert_eq!(config.analytics.page_size, 10);
        assert_eq!(config.narrative.max_tokens, 100);
        assert_eq!(config.assistant.max_tokens, 500);
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.default_provider, config.default_provider);
        assert_eq!(parsed.gateway.port, config.gateway.port);
        assert_eq!(parsed.analytics.plan_name_prefixes, vec!["PruBSN".to_string()]);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let config = AppConfig {
            default_temperature: 5.0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn three_digit_cutoff_rejected() {
        let mut config = AppConfig::default();
        config.analytics.century_cutoff = 150;
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_store_backend_rejected() {
        let mut config = AppConfig::default();
        config.store.backend = "postgres".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("postgres"));
    }

    #[test]
    fn unknown_narrative_strategy_rejected() {
        let mut config = AppConfig::default();
        config.narrative.strategy = "random".into();
        assert!(config.validate().is_err());
        config.narrative.strategy = "concurrent".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        assert_eq!(result.unwrap().default_model, "gpt-3.5-turbo");
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            tmp,
            r#"
default_model = "gpt-4o-mini"
fallbacks = ["openrouter"]

[analytics]
century_cutoff = 30

[providers.openrouter]
api_key = "sk-or-test"
timeout_secs = 15
"#
        )
        .unwrap();

        let config = AppConfig::load_from(tmp.path()).unwrap();
        assert_eq!(config.default_model, "gpt-4o-mini");
        assert_eq!(config.analytics.century_cutoff, 30);
        assert_eq!(config.analytics.page_size, 10);
        assert_eq!(config.fallbacks, vec!["openrouter".to_string()]);
        assert_eq!(config.providers["openrouter"].timeout_secs, 15);
        assert_eq!(config.store.backend, "file");
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "default_model = [").unwrap();
        let err = AppConfig::load_from(tmp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn debug_output_redacts_keys() {
        let config = AppConfig {
            api_key: Some("sk-secret-value".into()),
            ..AppConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret-value"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("gpt-3.5-turbo"));
        assert!(toml_str.contains("century_cutoff"));
    }
}
