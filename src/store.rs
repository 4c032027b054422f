//! Key/value storage module
//!
//! This module provides the simple persistence capability used by the
//! favorites and popular-cocktails adapters. Values are opaque strings; the
//! adapters decide how to serialize into them. [`FileStore`] keeps one file per
//! key in either the system's data directory (user data such as favorites) or
//! its cache directory (regenerable snapshots). [`MemoryStore`] keeps
//! everything in process memory.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to determine storage directory location
    #[error("Failed to determine storage directory location")]
    DirectoryNotFound,

    /// Failed to create or access storage directory
    #[error("Failed to create storage directory at {path}: {source}")]
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to read a stored value
    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write a value
    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to remove a value
    #[error("Failed to remove {path}: {source}")]
    RemoveFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The in-memory store's lock was poisoned by a panicking writer
    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Opaque get/set/remove persistence.
pub trait KeyValueStore: Send + Sync {
    /// Loads the value stored under `key`, or `None` if there is none.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removes the value under `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// A key/value store that keeps each value in its own file.
pub struct FileStore {
    /// The directory where values are stored
    dir: PathBuf,
}

impl FileStore {
    /// Opens or creates a store with the given name for regenerable data
    ///
    /// The store lives in the system's standard cache directory under a
    /// subdirectory named after the application and the provided name. The
    /// name will be sanitized (lowercased, non-alphanumeric characters
    /// replaced with underscores). The system may clear this directory.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let store = FileStore::open("popular")?;
    /// ```
    pub fn open(name: &str) -> Result<Self, StoreError> {
        Self::open_at(project_dirs()?.cache_dir().join(sanitize_name(name)))
    }

    /// Opens or creates a store with the given name for user data
    ///
    /// Same layout as [`FileStore::open`], but rooted in the system's data
    /// directory, which is never cleared behind the user's back.
    pub fn open_data(name: &str) -> Result<Self, StoreError> {
        Self::open_at(project_dirs()?.data_dir().join(sanitize_name(name)))
    }

    /// Opens or creates a store rooted at an explicit directory.
    pub fn open_at(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| StoreError::DirectoryCreationFailed {
            path: dir.clone(),
            source: e,
        })?;

        Ok(Self { dir })
    }

    /// Returns the path to the storage directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_name(key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let file_path = self.path_for(key);

        match fs::read_to_string(&file_path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::ReadFailed {
                path: file_path,
                source: e,
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let file_path = self.path_for(key);

        fs::write(&file_path, value).map_err(|e| StoreError::WriteFailed {
            path: file_path,
            source: e,
        })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let file_path = self.path_for(key);

        match fs::remove_file(&file_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::RemoveFailed {
                path: file_path,
                source: e,
            }),
        }
    }
}

fn project_dirs() -> Result<directories::ProjectDirs, StoreError> {
    directories::ProjectDirs::from("com", "cocktailfinder", "cocktail-finder")
        .ok_or(StoreError::DirectoryNotFound)
}

/// A key/value store held in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let values = self.values.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock().map_err(|_| StoreError::Poisoned)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock().map_err(|_| StoreError::Poisoned)?;
        values.remove(key);
        Ok(())
    }
}

/// Sanitizes a name for use in file paths
///
/// Converts to lowercase and replaces all characters that are not
/// a-z, 0-9, or hyphen with underscores.
fn sanitize_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
