//! Error types for the trustlens domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error type.
//!
//! Note that the analytics core never raises for malformed data: bad
//! identity codes, dates, and amounts degrade to "Unknown", 0, or exclusion.
//! The errors below describe the *edges* (the store medium and the LLM
//! transport), and callers in the core absorb them into fallback content.

use thiserror::Error;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Provider returned an empty response")]
    EmptyResponse,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage I/O failed for key '{key}': {reason}")]
    Io { key: String, reason: String },

    #[error("Stored value for key '{key}' is not valid: {reason}")]
    Corrupted { key: String, reason: String },

    #[error("Failed to serialize value for key '{key}': {reason}")]
    Serialization { key: String, reason: String },
}
