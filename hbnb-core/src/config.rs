//! Storage configuration.

use std::path::{Path, PathBuf};

/// File used when nothing else is configured.
pub const DEFAULT_FILE_PATH: &str = "file.json";

/// Environment variable overriding the storage file location.
pub const FILE_PATH_ENV: &str = "HBNB_FILE_PATH";

/// Where the object table is mirrored on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Path of the JSON file.
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_FILE_PATH),
        }
    }
}

impl StorageConfig {
    /// Create a configuration for an explicit file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// An unset or empty `HBNB_FILE_PATH` leaves the default in place.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        match lookup(FILE_PATH_ENV) {
            Some(path) if !path.trim().is_empty() => Self::new(path),
            _ => Self::default(),
        }
    }

    /// Set the storage file path.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
