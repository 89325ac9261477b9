//! # Cobalt Database Handle
//!
//! This module wraps the storage engine in a shareable handle and gives
//! each client connection its own session.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     Arc<Database>                        │
//! │                                                          │
//! │   ┌──────────────────┐          ┌────────────────────┐   │
//! │   │ Mutex<Engine>    │◄── save ─┤ data file (JSON)   │   │
//! │   │                  │── load ─►│ tmp + rename       │   │
//! │   └────────▲─────────┘          └────────────────────┘   │
//! │            │ lock per statement                          │
//! │   ┌────────┴─────────┐   ┌──────────────────┐            │
//! │   │ Session 1        │   │ Session 2        │   ...      │
//! │   │ SessionContext   │   │ SessionContext   │            │
//! │   └──────────────────┘   └──────────────────┘            │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example Usage
//!
//! ```
//! use std::sync::Arc;
//! use cobalt_server::database::Database;
//!
//! let db = Arc::new(Database::open_memory().unwrap());
//! let mut session = db.create_session().unwrap();
//!
//! assert_eq!(session.reply("CREATE DATABASE shop"), "OK");
//! assert_eq!(session.reply("USE shop"), "OK");
//! assert_eq!(session.reply("CREATE TABLE t (id INT)"), "OK");
//! assert_eq!(session.reply("SELECT * FROM t"), "id\n--\n");
//! ```

mod engine;
mod error;
mod session;

pub use engine::{Database, DatabaseConfig, DatabaseStats};
pub use error::{DatabaseError, DatabaseResult};
pub use session::{Session, SessionId, SessionState};
