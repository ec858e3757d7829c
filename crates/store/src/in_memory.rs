//! In-memory store, useful for testing and ephemeral sessions.

use std::collections::HashMap;
use std::sync::RwLock;
use trustlens_core::KeyValueStore;
use trustlens_core::error::StoreError;

/// A store that keeps every value in a map. Nothing survives the process.
#[derive(Default)]
pub struct InMemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held.
    pub fn len(&self) -> usize {
        self.values.read().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned(key: &str) -> StoreError {
    StoreError::Io {
        key: key.to_string(),
        reason: "store lock poisoned".into(),
    }
}

impl KeyValueStore for InMemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let values = self.values.read().map_err(|_| poisoned(key))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut values = self.values.write().map_err(|_| poisoned(key))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, StoreError> {
        let mut values = self.values.write().map_err(|_| poisoned(key))?;
        Ok(values.remove(key).is_some())
    }
}
