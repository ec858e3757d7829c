//! Store trait: the persisted key-value medium.
//!
//! Three entities are persisted, each under its own key and updated
//! independently: the roster snapshot, the narrative cache entry, and the
//! conversation history. The store is synchronous and always consistent;
//! reads never observe a half-written value.
//!
//! Implementations: in-memory (tests, ephemeral sessions) and file-per-key.

use crate::error::StoreError;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// The well-known keys used by the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    /// The roster snapshot (JSON array of client records).
    Roster,
    /// The narrative cache entry (fingerprint + comments by category).
    NarrativeCache,
    /// The conversation history (JSON array of messages).
    Conversation,
}

impl StoreKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKey::Roster => "clients",
            StoreKey::NarrativeCache => "chart_comments",
            StoreKey::Conversation => "chat_messages",
        }
    }
}

impl std::fmt::Display for StoreKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The core KeyValueStore trait.
///
/// Values are opaque strings (serialized JSON in practice).
pub trait KeyValueStore: Send + Sync {
    /// The backend name (e.g., "memory", "file").
    fn name(&self) -> &str;

    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove `key`. Returns whether a value was present.
    fn remove(&self, key: &str) -> Result<bool, StoreError>;
}

/// Read and deserialize a JSON value.
///
/// A value that no longer parses is reported as [`StoreError::Corrupted`]
/// so callers can decide whether to treat it as absent.
pub fn read_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: StoreKey,
) -> Result<Option<T>, StoreError> {
    let Some(raw) = store.get(key.as_str())? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| StoreError::Corrupted {
            key: key.to_string(),
            reason: e.to_string(),
        })
}

/// Serialize and write a JSON value.
pub fn write_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: StoreKey,
    value: &T,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(value).map_err(|e| StoreError::Serialization {
        key: key.to_string(),
        reason: e.to_string(),
    })?;
    store.set(key.as_str(), &raw)
}
