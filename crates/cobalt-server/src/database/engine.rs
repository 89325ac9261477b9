//! Shared database handle.
//!
//! The `Database` struct is the top-level entry point of the server. It owns
//! the storage engine behind a mutex, tracks sessions and statements, and
//! moves the engine state to and from the data file.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, info};

use cobalt_sql::executor::{ExecResult, Executor, SessionContext};
use cobalt_sql::parser::{Command, ParseResult, Parser};
use cobalt_sql::storage::{snapshot, Engine};

use super::error::{DatabaseError, DatabaseResult};
use super::session::{Session, SessionId};

/// Database configuration.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Path to the JSON data file (None for in-memory).
    pub data_file: Option<PathBuf>,
    /// Maximum number of concurrent sessions.
    pub max_sessions: usize,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            data_file: None,
            max_sessions: 1000,
        }
    }
}

impl DatabaseConfig {
    /// Creates an in-memory configuration.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Creates a configuration backed by a data file.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            data_file: Some(path.into()),
            ..Default::default()
        }
    }

    /// Sets the maximum number of concurrent sessions.
    pub fn max_sessions(mut self, max: usize) -> Self {
        self.max_sessions = max;
        self
    }
}

/// Database statistics.
#[derive(Debug, Default, Clone)]
pub struct DatabaseStats {
    /// Number of active sessions.
    pub active_sessions: usize,
    /// Total sessions created.
    pub total_sessions: u64,
    /// Total statements executed.
    pub total_statements: u64,
    /// Number of databases.
    pub databases: usize,
    /// Total tables across all databases.
    pub tables: usize,
    /// Total rows across all tables.
    pub rows: usize,
    /// Uptime.
    pub uptime: Duration,
}

/// The shared database handle.
pub struct Database {
    config: DatabaseConfig,
    engine: Mutex<Engine>,
    next_session_id: AtomicU64,
    active_sessions: AtomicUsize,
    total_sessions: AtomicU64,
    total_statements: AtomicU64,
    started_at: Instant,
}

impl Database {
    /// Opens a database with the given configuration.
    ///
    /// If the configuration names a data file that exists, its snapshot is
    /// loaded. A missing file starts an empty engine.
    pub fn open(config: DatabaseConfig) -> DatabaseResult<Self> {
        let engine = match &config.data_file {
            Some(path) if path.exists() => {
                let engine = Self::load_file(path)?;
                info!(
                    path = %path.display(),
                    databases = engine.database_names().len(),
                    "Loaded data file"
                );
                engine
            }
            Some(path) => {
                info!(path = %path.display(), "No data file, starting fresh");
                Engine::new()
            }
            None => Engine::new(),
        };

        Ok(Self {
            config,
            engine: Mutex::new(engine),
            next_session_id: AtomicU64::new(1),
            active_sessions: AtomicUsize::new(0),
            total_sessions: AtomicU64::new(0),
            total_statements: AtomicU64::new(0),
            started_at: Instant::now(),
        })
    }

    /// Opens an in-memory database.
    pub fn open_memory() -> DatabaseResult<Self> {
        Self::open(DatabaseConfig::in_memory())
    }

    /// Opens a database backed by a data file.
    pub fn open_path(path: impl AsRef<Path>) -> DatabaseResult<Self> {
        Self::open(DatabaseConfig::with_path(path.as_ref()))
    }

    fn load_file(path: &Path) -> DatabaseResult<Engine> {
        let text = fs::read_to_string(path)
            .map_err(|e| DatabaseError::Io(format!("{}: {}", path.display(), e)))?;
        Ok(snapshot::from_str(&text)?)
    }

    /// Returns the configuration.
    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Returns the data file path, if any.
    pub fn data_file(&self) -> Option<&Path> {
        self.config.data_file.as_deref()
    }

    /// Returns true if this database is not backed by a file.
    pub fn is_memory(&self) -> bool {
        self.config.data_file.is_none()
    }

    /// Creates a new session.
    ///
    /// Fails once `max_sessions` sessions are active.
    pub fn create_session(self: &Arc<Self>) -> DatabaseResult<Session> {
        let max = self.config.max_sessions;
        self.active_sessions
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (n < max).then_some(n + 1)
            })
            .map_err(|_| {
                DatabaseError::SessionError(format!("Too many sessions (max {})", max))
            })?;

        let id = SessionId::new(self.next_session_id.fetch_add(1, Ordering::SeqCst));
        self.total_sessions.fetch_add(1, Ordering::Relaxed);
        debug!(session = %id, "Created session");

        Ok(Session::new(id, Arc::clone(self)))
    }

    /// Releases a session slot.
    pub(super) fn release_session(&self, id: SessionId) {
        self.active_sessions.fetch_sub(1, Ordering::SeqCst);
        debug!(session = %id, "Closed session");
    }

    /// Parses and executes one statement under the engine lock.
    ///
    /// Parsing happens before the lock is taken.
    pub fn execute_in(&self, ctx: &mut SessionContext, sql: &str) -> ExecResult {
        self.execute_parsed(ctx, &Parser::parse(sql))
    }

    /// Executes an already parsed statement under the engine lock.
    pub fn execute_parsed(
        &self,
        ctx: &mut SessionContext,
        parsed: &ParseResult<Command>,
    ) -> ExecResult {
        let result = {
            let mut engine = self.engine.lock();
            Executor::execute(parsed, &mut engine, ctx)
        };
        self.total_statements.fetch_add(1, Ordering::Relaxed);
        result
    }

    /// Runs a closure with read access to the engine.
    pub fn with_engine<R>(&self, f: impl FnOnce(&Engine) -> R) -> R {
        f(&self.engine.lock())
    }

    /// Writes the engine state to the data file.
    ///
    /// The snapshot is written to a temporary file next to the data file and
    /// renamed over it. In-memory databases do nothing.
    pub fn save(&self) -> DatabaseResult<()> {
        let Some(path) = &self.config.data_file else {
            debug!("In-memory database, nothing to save");
            return Ok(());
        };

        let text = {
            let engine = self.engine.lock();
            snapshot::to_string(&engine)?
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut tmp = path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, text)
            .map_err(|e| DatabaseError::Io(format!("{}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, path)
            .map_err(|e| DatabaseError::Io(format!("{}: {}", path.display(), e)))?;

        info!(path = %path.display(), "Saved data file");
        Ok(())
    }

    /// Returns database statistics.
    pub fn stats(&self) -> DatabaseStats {
        let (databases, tables, rows) = self.with_engine(|engine| {
            engine.databases().fold((0, 0, 0), |(d, t, r), db| {
                (
                    d + 1,
                    t + db.tables().count(),
                    r + db.tables().map(|t| t.num_rows()).sum::<usize>(),
                )
            })
        });

        DatabaseStats {
            active_sessions: self.active_sessions.load(Ordering::SeqCst),
            total_sessions: self.total_sessions.load(Ordering::Relaxed),
            total_statements: self.total_statements.load(Ordering::Relaxed),
            databases,
            tables,
            rows,
            uptime: self.started_at.elapsed(),
        }
    }

    /// Persists the engine state and reports shutdown.
    pub fn close(&self) -> DatabaseResult<()> {
        let active = self.active_sessions.load(Ordering::SeqCst);
        if active > 0 {
            debug!(active, "Closing with active sessions");
        }
        self.save()?;
        info!("Database closed");
        Ok(())
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("config", &self.config)
            .field("active_sessions", &self.active_sessions.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_memory() {
        let db = Database::open_memory().unwrap();
        assert!(db.is_memory());
        assert!(db.data_file().is_none());
        assert!(db.with_engine(|e| e.is_empty()));
        db.save().unwrap();
    }

    #[test]
    fn test_open_missing_file_starts_fresh() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dbdata.json");

        let db = Database::open_path(&path).unwrap();
        assert!(db.with_engine(|e| e.is_empty()));
        assert!(!path.exists());
    }

    #[test]
    fn test_save_and_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dbdata.json");

        {
            let db = Arc::new(Database::open_path(&path).unwrap());
            let mut session = db.create_session().unwrap();
            for sql in [
                "CREATE DATABASE shop",
                "USE shop",
                "CREATE TABLE users (id INT, name STR)",
                "INSERT INTO users VALUES (1, 'Ann')",
            ] {
                assert!(session.execute(sql).ok, "{sql}");
            }
            db.save().unwrap();
        }
        assert!(path.exists());
        assert!(!dir.path().join("dbdata.json.tmp").exists());

        let db = Arc::new(Database::open_path(&path).unwrap());
        let mut session = db.create_session().unwrap();
        assert!(session.execute("USE shop").ok);
        assert_eq!(
            session.execute("SELECT * FROM users").result,
            "id | name\n---+-----\n1 | Ann\n"
        );
    }

    #[test]
    fn test_open_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dbdata.json");
        fs::write(&path, "not json").unwrap();

        let err = Database::open_path(&path).unwrap_err();
        assert!(matches!(err, DatabaseError::Snapshot(_)));
    }

    #[test]
    fn test_session_limit() {
        let db = Arc::new(Database::open(DatabaseConfig::in_memory().max_sessions(1)).unwrap());

        let first = db.create_session().unwrap();
        let err = db.create_session().unwrap_err();
        assert!(err.to_string().contains("Too many sessions"));

        drop(first);
        assert!(db.create_session().is_ok());
    }

    #[test]
    fn test_stats() {
        let db = Arc::new(Database::open_memory().unwrap());
        let mut session = db.create_session().unwrap();
        for sql in [
            "CREATE DATABASE a",
            "CREATE DATABASE b",
            "USE a",
            "CREATE TABLE t (id INT)",
            "INSERT INTO t VALUES (1)",
            "INSERT INTO t VALUES (2)",
            "bogus",
        ] {
            session.execute(sql);
        }

        let stats = db.stats();
        assert_eq!(stats.active_sessions, 1);
        assert_eq!(stats.total_sessions, 1);
        assert_eq!(stats.total_statements, 7);
        assert_eq!(stats.databases, 2);
        assert_eq!(stats.tables, 1);
        assert_eq!(stats.rows, 2);
    }
}
