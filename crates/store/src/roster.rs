//! Roster repository: the single owner of the roster key.
//!
//! Replacing or clearing the roster goes through here so the narrative
//! cache can never outlive the data it describes.

use std::sync::Arc;
use tracing::{info, warn};
use trustlens_core::error::StoreError;
use trustlens_core::store::{read_json, write_json};
use trustlens_core::{KeyValueStore, Roster, StoreKey};

#[derive(Clone)]
pub struct RosterRepository {
    store: Arc<dyn KeyValueStore>,
}

impl RosterRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Read the persisted roster. An absent key is an empty roster.
    pub fn load(&self) -> Result<Roster, StoreError> {
        Ok(read_json(self.store.as_ref(), StoreKey::Roster)?.unwrap_or_default())
    }

    /// Read the persisted roster, treating any store failure as empty.
    pub fn snapshot(&self) -> Roster {
        match self.load() {
            Ok(roster) => roster,
            Err(e) => {
                warn!(error = %e, "Failed to read roster, treating as empty");
                Vec::new()
            }
        }
    }

    /// Replace the persisted roster.
    pub fn replace(&self, roster: &Roster) -> Result<(), StoreError> {
        write_json(self.store.as_ref(), StoreKey::Roster, roster)?;
        info!(records = roster.len(), "Roster replaced");
        Ok(())
    }

    /// Remove the roster and the narrative cache entry derived from it.
    ///
    /// Both removals are attempted; the first failure is returned.
    pub fn clear(&self) -> Result<(), StoreError> {
        let roster = self.store.remove(StoreKey::Roster.as_str());
        let cache = self.store.remove(StoreKey::NarrativeCache.as_str());
        roster?;
        cache?;
        info!("Roster and narrative cache cleared");
        Ok(())
    }
}
