//! # cobalt-server
//!
//! Network server and shared database handle for Cobalt.
//!
//! This crate provides:
//!
//! - **Database Handle**: An `Arc`-shared wrapper around the storage engine
//!   that loads and saves the JSON data file and hands out sessions.
//!
//! - **Session Management**: Per-connection state, most importantly the
//!   currently selected database.
//!
//! - **TCP Server**: Length-prefixed text frames, one task per connection,
//!   plus a small async client.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use cobalt_server::database::Database;
//!
//! let db = Arc::new(Database::open_memory().unwrap());
//! let mut session = db.create_session().unwrap();
//!
//! session.execute("CREATE DATABASE shop");
//! session.execute("USE shop");
//! session.execute("CREATE TABLE users (id INT, name STR)");
//! session.execute("INSERT INTO users VALUES (1, 'Ann')");
//!
//! let reply = session.reply("SELECT * FROM users");
//! assert_eq!(reply, "id | name\n---+-----\n1 | Ann\n");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Shared database handle and sessions.
pub mod database;

/// TCP transport, client and operator console.
pub mod server;

/// Server configuration.
pub mod config;

// Re-export commonly used types
pub use config::ServerConfig;
pub use database::{
    Database, DatabaseConfig, DatabaseError, DatabaseResult, DatabaseStats, Session, SessionId,
    SessionState,
};
pub use server::{Client, Server, ServerError, ServerResult};
