//! Session management for client connections.
//!
//! A Session represents a single client connection to the database. It
//! holds the connection's current database selection and executes one
//! statement at a time against the shared engine.

use std::sync::Arc;

use tracing::debug;

use cobalt_sql::executor::{ExecResult, SessionContext};
use cobalt_sql::parser::{Command, ParseResult, Parser};

use super::engine::Database;

/// Unique session identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl SessionId {
    /// Creates a new session ID.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the numeric ID.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session_{}", self.0)
    }
}

/// Session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Session accepts statements.
    Active,
    /// Session is closed.
    Closed,
}

/// A database session representing a client connection.
pub struct Session {
    id: SessionId,
    db: Arc<Database>,
    context: SessionContext,
    state: SessionState,
    statement_count: u64,
}

impl Session {
    pub(super) fn new(id: SessionId, db: Arc<Database>) -> Self {
        Self {
            id,
            db,
            context: SessionContext::new(),
            state: SessionState::Active,
            statement_count: 0,
        }
    }

    /// Returns the session ID.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Returns the current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns the selected database, if any.
    pub fn current_database(&self) -> Option<&str> {
        self.context.current_database()
    }

    /// Returns the number of statements executed.
    pub fn statement_count(&self) -> u64 {
        self.statement_count
    }

    /// Executes one statement.
    pub fn execute(&mut self, sql: &str) -> ExecResult {
        self.run(&Parser::parse(sql))
    }

    /// Executes one statement and renders the reply sent to the client.
    pub fn reply(&mut self, sql: &str) -> String {
        let parsed = Parser::parse(sql);
        self.run(&parsed).reply(&parsed)
    }

    fn run(&mut self, parsed: &ParseResult<Command>) -> ExecResult {
        if self.state == SessionState::Closed {
            return ExecResult::failure("Session is closed");
        }

        self.statement_count += 1;
        let result = self.db.execute_parsed(&mut self.context, parsed);
        debug!(
            session = %self.id,
            ok = result.ok,
            mutation = parsed.as_ref().is_ok_and(|c| c.is_mutation()),
            statement = self.statement_count,
            "Executed statement"
        );
        result
    }

    /// Closes the session. Further statements fail.
    pub fn close(&mut self) {
        if self.state == SessionState::Active {
            self.state = SessionState::Closed;
            self.db.release_session(self.id);
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("current_database", &self.context.current_database())
            .field("statement_count", &self.statement_count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_display() {
        let id = SessionId::new(7);
        assert_eq!(id.as_u64(), 7);
        assert_eq!(id.to_string(), "session_7");
    }

    #[test]
    fn test_independent_current_databases() {
        let db = Arc::new(Database::open_memory().unwrap());
        let mut a = db.create_session().unwrap();
        let mut b = db.create_session().unwrap();
        assert_ne!(a.id(), b.id());

        assert!(a.execute("CREATE DATABASE one").ok);
        assert!(a.execute("CREATE DATABASE two").ok);
        assert!(a.execute("USE one").ok);
        assert!(b.execute("USE two").ok);

        assert_eq!(a.current_database(), Some("one"));
        assert_eq!(b.current_database(), Some("two"));

        assert!(a.execute("CREATE TABLE t (id INT)").ok);
        assert_eq!(b.reply("SELECT * FROM t"), "Error: Table not found");
    }

    #[test]
    fn test_drop_selected_database_from_other_session() {
        let db = Arc::new(Database::open_memory().unwrap());
        let mut a = db.create_session().unwrap();
        let mut b = db.create_session().unwrap();

        assert!(a.execute("CREATE DATABASE shop").ok);
        assert!(a.execute("USE shop").ok);
        assert!(b.execute("DROP DATABASE shop").ok);

        assert_eq!(a.current_database(), Some("shop"));
        assert_eq!(
            a.reply("CREATE TABLE t (id INT)"),
            "Error: Database not found"
        );
    }

    #[test]
    fn test_reply_sends_text_only_for_select() {
        let db = Arc::new(Database::open_memory().unwrap());
        let mut session = db.create_session().unwrap();
        for sql in [
            "CREATE DATABASE shop",
            "USE shop",
            "CREATE TABLE t (id INT)",
            "INSERT INTO t VALUES (1)",
            "INSERT INTO t VALUES (2)",
        ] {
            assert_eq!(session.reply(sql), "OK", "{sql}");
        }

        assert_eq!(session.reply("UPDATE t SET id = 3 WHERE id = 1"), "OK");
        assert_eq!(session.reply("DELETE FROM t WHERE id = 2"), "OK");
        assert_eq!(session.reply("SELECT * FROM t"), "id\n--\n3\n");
        assert_eq!(session.reply("DELETE FROM t"), "OK");
        assert_eq!(session.reply("SELEC * FROM t"), "Error: Unknown or unsupported command");

        let result = session.execute("INSERT INTO t VALUES (4)");
        assert!(result.ok);
        assert_eq!(session.execute("UPDATE t SET id = 5").result, "Updated 1 row(s)");
    }

    #[test]
    fn test_close_session() {
        let db = Arc::new(Database::open_memory().unwrap());
        let mut session = db.create_session().unwrap();
        assert_eq!(db.stats().active_sessions, 1);

        session.execute("CREATE DATABASE x");
        assert_eq!(session.statement_count(), 1);

        session.close();
        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(db.stats().active_sessions, 0);
        assert_eq!(session.execute("USE x").error, "Session is closed");
        assert_eq!(session.reply("USE x"), "Error: Session is closed");

        drop(session);
        assert_eq!(db.stats().active_sessions, 0);
    }
}
