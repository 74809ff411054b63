//! Error types for the HBNB core.
//!
//! Uses thiserror for ergonomic error definition. A missing key is never an
//! error here: lookups return `Option`, and the console reports absence itself.

/// Entity-specific errors
#[derive(Debug, thiserror::Error)]
pub enum EntityError {
    /// Attempt to overwrite identity, timestamps or the kind tag
    #[error("Attribute '{0}' is reserved")]
    ReservedAttribute(String),

    /// A serialized timestamp could not be parsed
    #[error("Invalid timestamp '{value}': {source}")]
    Timestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Storage-specific errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// IO error other than a missing file on reload
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The storage file is not a valid object map
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An entry could not be rebuilt into an entity
    #[error("Invalid entry '{key}': {source}")]
    InvalidEntry {
        key: String,
        #[source]
        source: EntityError,
    },
}

/// Console-specific errors
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    /// Persisting the table failed
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Reading commands or writing output failed
    #[error("Console IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for entity operations
pub type EntityResult<T> = std::result::Result<T, EntityError>;

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Result type for console operations
pub type ConsoleResult<T> = std::result::Result<T, ConsoleError>;
