//! Persistent key-value storage for the session.
//!
//! The store is a best-effort cache. It never decides authorization: the
//! session validates whatever it reads back and discards it on any doubt.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::constants::DEFAULT_STORE_DIR;
use crate::error::StoreError;

/// Synchronous key-value store used for the session blob and the permission cache.
pub trait SessionStore: Send + Sync {
    /// Reads a value, `None` if absent.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Writes a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removes a value. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// In-process store; contents are lost with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries().remove(key);
        Ok(())
    }
}

/// One JSON file per key under a directory, readable only by the owner.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `~/.wastedesk`, or `None` when there is no home directory.
    pub fn default_location() -> Option<Self> {
        dirs::home_dir().map(|home| Self::new(home.join(DEFAULT_STORE_DIR)))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    /// Replaces the file at `path` with `value`, mode 0600 on Unix.
    fn write_owner_only(path: &Path, value: &str) -> std::io::Result<()> {
        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        std::os::unix::fs::OpenOptionsExt::mode(&mut options, 0o600);

        let mut file = options.open(path)?;
        // The open mode only applies to newly created files.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        }
        file.write_all(value.as_bytes())
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            key: key.to_string(),
            source,
        };

        std::fs::create_dir_all(&self.root).map_err(io_err)?;
        let path = self.path_for(key);
        Self::write_owner_only(&path, value).map_err(io_err)?;

        tracing::trace!(key, path = %path.display(), "Wrote store entry");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }
}
