//! File-per-key store.
//!
//! Each key lives in `<dir>/<key>.json`. Every write goes to its own
//! uniquely named temp file in the same directory, which is then renamed
//! over the target, so a reader sees either the old value or the new one
//! and concurrent writers never share a temp file.
//!
//! Default location: `~/.trustlens/store/`

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use trustlens_core::KeyValueStore;
use trustlens_core::error::StoreError;

pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: PathBuf) -> Self {
        debug!(dir = %dir.display(), "File store opened");
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`.
    ///
    /// Anything outside `[A-Za-z0-9_-]` is replaced so a key can never
    /// escape the store directory.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }
}

fn io_error(key: &str, e: std::io::Error) -> StoreError {
    StoreError::Io {
        key: key.to_string(),
        reason: e.to_string(),
    }
}

impl KeyValueStore for FileStore {
    fn name(&self) -> &str {
        "file"
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(key, e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| io_error(key, e))?;

        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir).map_err(|e| io_error(key, e))?;
        tmp.write_all(value.as_bytes()).map_err(|e| io_error(key, e))?;
        tmp.persist(self.path_for(key)).map_err(|e| io_error(key, e.error))?;

        debug!(key, bytes = value.len(), "Stored value");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, StoreError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error(key, e)),
        }
    }
}
