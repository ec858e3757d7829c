//! Store implementations for trustlens.

pub mod file;
pub mod in_memory;
pub mod roster;

pub use file::FileStore;
pub use in_memory::InMemoryStore;
pub use roster::RosterRepository;

use std::path::PathBuf;
use std::sync::Arc;
use trustlens_core::KeyValueStore;

/// Build a store from a backend name.
///
/// Unknown names fall back to the in-memory backend with a warning; the
/// config layer rejects them before this is reached in practice.
pub fn open(backend: &str, path: PathBuf) -> Arc<dyn KeyValueStore> {
    match backend {
        "file" => Arc::new(FileStore::new(path)),
        "memory" => Arc::new(InMemoryStore::new()),
        other => {
            tracing::warn!(backend = other, "Unknown store backend, using in-memory store");
            Arc::new(InMemoryStore::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_selects_backend_by_name() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(open("file", dir.path().to_path_buf()).name(), "file");
        assert_eq!(open("memory", dir.path().to_path_buf()).name(), "memory");
        assert_eq!(open("redis", dir.path().to_path_buf()).name(), "memory");
    }
}
