//! Server error types.

use thiserror::Error;

use crate::database::DatabaseError;

/// Errors that can occur while serving or talking to a server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// A frame announced a payload above the configured limit.
    #[error("frame too large: {size} bytes (max {max})")]
    FrameTooLarge {
        /// Announced payload size.
        size: usize,
        /// Configured maximum.
        max: usize,
    },
    /// A frame payload was not valid UTF-8.
    #[error("invalid frame payload: {0}")]
    InvalidPayload(String),
    /// The peer closed the connection.
    #[error("connection closed")]
    ConnectionClosed,
    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),
    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
