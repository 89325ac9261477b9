//! Storage error types.

use std::fmt;

/// Storage error type.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageError {
    /// Database already exists.
    DatabaseExists(String),
    /// Table already exists.
    TableExists(String),
    /// Two columns of one table share a name.
    DuplicateColumn(String),
    /// Row does not fit the table's columns.
    SchemaMismatch(String),
    /// Snapshot document could not be decoded.
    Snapshot(String),
    /// Snapshot was written by an incompatible format version.
    UnsupportedVersion(u32),
    /// Internal error.
    Internal(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::DatabaseExists(name) => write!(f, "Database '{}' already exists", name),
            StorageError::TableExists(name) => write!(f, "Table '{}' already exists", name),
            StorageError::DuplicateColumn(name) => write!(f, "Duplicate column name '{}'", name),
            StorageError::SchemaMismatch(msg) => write!(f, "Schema mismatch: {}", msg),
            StorageError::Snapshot(msg) => write!(f, "Invalid snapshot: {}", msg),
            StorageError::UnsupportedVersion(v) => {
                write!(f, "Unsupported snapshot version: {}", v)
            }
            StorageError::Internal(msg) => write!(f, "Internal storage error: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Snapshot(e.to_string())
    }
}

/// Storage result type.
pub type StorageResult<T> = Result<T, StorageError>;
