//! Database error types.

use std::fmt;
use std::io;

use cobalt_sql::storage::StorageError;

/// Database errors.
#[derive(Debug)]
pub enum DatabaseError {
    /// Reading or writing the data file failed.
    Io(String),
    /// The data file could not be decoded or encoded.
    Snapshot(StorageError),
    /// Session error.
    SessionError(String),
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseError::Io(msg) => write!(f, "io error: {}", msg),
            DatabaseError::Snapshot(e) => write!(f, "snapshot error: {}", e),
            DatabaseError::SessionError(msg) => write!(f, "session error: {}", msg),
        }
    }
}

impl std::error::Error for DatabaseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DatabaseError::Snapshot(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StorageError> for DatabaseError {
    fn from(e: StorageError) -> Self {
        DatabaseError::Snapshot(e)
    }
}

impl From<io::Error> for DatabaseError {
    fn from(e: io::Error) -> Self {
        DatabaseError::Io(e.to_string())
    }
}

/// Database result type.
pub type DatabaseResult<T> = Result<T, DatabaseError>;
