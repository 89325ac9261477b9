//! Command dispatch.
//!
//! [`Executor::execute`] applies one parsed command to an [`Engine`] on
//! behalf of a session. The executor itself holds no state: the engine and
//! the session's current-database selection are passed in on every call.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, error};

use super::{ExecResult, ExecutionError, ExecutionResult};
use crate::parser::{Command, ParseResult};
use crate::storage::{Database, Engine};

/// Per-session execution state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    current_database: Option<String>,
}

impl SessionContext {
    /// Creates a context with no database selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context with `name` already selected.
    pub fn with_database(name: impl Into<String>) -> Self {
        Self {
            current_database: Some(name.into()),
        }
    }

    /// Returns the selected database, if any.
    pub fn current_database(&self) -> Option<&str> {
        self.current_database.as_deref()
    }

    /// Selects a database.
    pub fn use_database(&mut self, name: impl Into<String>) {
        self.current_database = Some(name.into());
    }

    /// Clears the selection.
    pub fn clear_database(&mut self) {
        self.current_database = None;
    }
}

/// Stateless command executor.
pub struct Executor;

impl Executor {
    /// Executes a parse result against the engine.
    ///
    /// A parse failure is reported without touching the engine. Execution
    /// errors, and panics raised inside a handler, become failed results.
    pub fn execute(
        parsed: &ParseResult<Command>,
        engine: &mut Engine,
        ctx: &mut SessionContext,
    ) -> ExecResult {
        let command = match parsed {
            Ok(command) => command,
            Err(e) => return ExecResult::failure(e.to_string()),
        };

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| Self::dispatch(command, engine, ctx)));
        match outcome {
            Ok(Ok(text)) => ExecResult::success(text),
            Ok(Err(e)) => {
                debug!(command = command.kind(), error = %e, "Command failed");
                ExecResult::failure(e.to_string())
            }
            Err(payload) => {
                let e = ExecutionError::Internal(panic_message(payload.as_ref()));
                error!(command = command.kind(), error = %e, "Command panicked");
                ExecResult::failure(e.to_string())
            }
        }
    }

    /// Routes a command to its handler.
    pub fn dispatch(
        command: &Command,
        engine: &mut Engine,
        ctx: &mut SessionContext,
    ) -> ExecutionResult<String> {
        debug!(
            command = command.kind(),
            database = ctx.current_database().unwrap_or("-"),
            "Executing command"
        );

        match command {
            Command::CreateDatabase(stmt) => Self::execute_create_database(stmt, engine),
            Command::DropDatabase(stmt) => Self::execute_drop_database(stmt, engine, ctx),
            Command::Use(stmt) => Self::execute_use(stmt, engine, ctx),
            Command::CreateTable(stmt) => Self::execute_create_table(stmt, engine, ctx),
            Command::DropTable(stmt) => Self::execute_drop_table(stmt, engine, ctx),
            Command::Insert(stmt) => Self::execute_insert(stmt, engine, ctx),
            Command::Select(stmt) => Self::execute_select(stmt, engine, ctx),
            Command::Update(stmt) => Self::execute_update(stmt, engine, ctx),
            Command::Delete(stmt) => Self::execute_delete(stmt, engine, ctx),
        }
    }
}

/// Resolves the session's current database.
pub(super) fn current_database<'a>(
    engine: &'a Engine,
    ctx: &SessionContext,
) -> ExecutionResult<&'a Database> {
    let name = ctx
        .current_database()
        .ok_or(ExecutionError::NoDatabaseSelected)?;
    engine
        .get_database(name)
        .ok_or(ExecutionError::DatabaseNotFound)
}

/// Resolves the session's current database mutably.
pub(super) fn current_database_mut<'a>(
    engine: &'a mut Engine,
    ctx: &SessionContext,
) -> ExecutionResult<&'a mut Database> {
    let name = ctx
        .current_database()
        .ok_or(ExecutionError::NoDatabaseSelected)?;
    engine
        .get_database_mut(name)
        .ok_or(ExecutionError::DatabaseNotFound)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
