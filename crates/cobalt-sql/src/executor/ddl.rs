//! Database and table definition commands.

use tracing::{debug, info};

use super::engine::{current_database, current_database_mut};
use super::{ExecutionError, ExecutionResult, Executor, SessionContext};
use crate::parser::{
    CreateDatabaseStatement, CreateTableStatement, DropDatabaseStatement, DropTableStatement,
    UseStatement,
};
use crate::storage::{Column, Engine};

impl Executor {
    /// Executes CREATE DATABASE.
    pub fn execute_create_database(
        stmt: &CreateDatabaseStatement,
        engine: &mut Engine,
    ) -> ExecutionResult<String> {
        engine.create_database(&stmt.name)?;
        info!(database = %stmt.name, "Created database");
        Ok(String::new())
    }

    /// Executes DROP DATABASE.
    ///
    /// Missing names are skipped. If the session's current database is
    /// dropped, the selection is cleared.
    pub fn execute_drop_database(
        stmt: &DropDatabaseStatement,
        engine: &mut Engine,
        ctx: &mut SessionContext,
    ) -> ExecutionResult<String> {
        for name in &stmt.names {
            if engine.drop_database(name) {
                info!(database = %name, "Dropped database");
            }
            if ctx.current_database() == Some(name.as_str()) {
                ctx.clear_database();
            }
        }
        Ok(String::new())
    }

    /// Executes USE.
    pub fn execute_use(
        stmt: &UseStatement,
        engine: &Engine,
        ctx: &mut SessionContext,
    ) -> ExecutionResult<String> {
        if !engine.has_database(&stmt.database) {
            return Err(ExecutionError::DatabaseNotFound);
        }
        ctx.use_database(stmt.database.clone());
        Ok(String::new())
    }

    /// Executes CREATE TABLE.
    ///
    /// Every foreign key is checked before anything is created: the
    /// referenced table and column must already exist, and the constrained
    /// column must be part of the new table.
    pub fn execute_create_table(
        stmt: &CreateTableStatement,
        engine: &mut Engine,
        ctx: &SessionContext,
    ) -> ExecutionResult<String> {
        let db = current_database(engine, ctx)?;

        for def in &stmt.columns {
            let Some(fk) = &def.references else {
                continue;
            };
            let referenced = db
                .get_table(&fk.table)
                .ok_or_else(|| ExecutionError::ReferencedTableMissing(fk.table.clone()))?;
            if referenced.column_index(&fk.column).is_none() {
                return Err(ExecutionError::ReferencedColumnMissing {
                    table: fk.table.clone(),
                    column: fk.column.clone(),
                });
            }
        }

        let columns: Vec<Column> = stmt
            .columns
            .iter()
            .map(|def| {
                let column = Column::new(def.name.clone(), def.data_type);
                match &def.references {
                    Some(fk) => column.with_foreign_key(fk.clone()),
                    None => column,
                }
            })
            .collect();

        current_database_mut(engine, ctx)?.create_table(&stmt.name, columns)?;
        debug!(table = %stmt.name, columns = stmt.columns.len(), "Created table");
        Ok(String::new())
    }

    /// Executes DROP TABLE. Missing names are skipped.
    pub fn execute_drop_table(
        stmt: &DropTableStatement,
        engine: &mut Engine,
        ctx: &SessionContext,
    ) -> ExecutionResult<String> {
        let db = current_database_mut(engine, ctx)?;
        for name in &stmt.names {
            if db.drop_table(name) {
                debug!(table = %name, "Dropped table");
            }
        }
        Ok(String::new())
    }
}

#[cfg(test)]
mod tests {
    use crate::executor::{ExecResult, Executor, SessionContext};
    use crate::parser::Parser;
    use crate::storage::{Engine, ForeignKey};

    fn run(sql: &str, engine: &mut Engine, ctx: &mut SessionContext) -> ExecResult {
        Executor::execute(&Parser::parse(sql), engine, ctx)
    }

    fn shop() -> (Engine, SessionContext) {
        let mut engine = Engine::new();
        let mut ctx = SessionContext::new();
        assert!(run("CREATE DATABASE shop", &mut engine, &mut ctx).ok);
        assert!(run("USE shop", &mut engine, &mut ctx).ok);
        (engine, ctx)
    }

    #[test]
    fn test_create_and_use_database() {
        let (mut engine, mut ctx) = shop();
        assert_eq!(ctx.current_database(), Some("shop"));

        let result = run("CREATE DATABASE shop", &mut engine, &mut ctx);
        assert_eq!(result.error, "Database 'shop' already exists");

        let result = run("USE nowhere", &mut engine, &mut ctx);
        assert_eq!(result.error, "Database not found");
        assert_eq!(ctx.current_database(), Some("shop"));
    }

    #[test]
    fn test_drop_current_database_clears_selection() {
        let (mut engine, mut ctx) = shop();

        let result = run("DROP DATABASE shop missing", &mut engine, &mut ctx);
        assert!(result.ok);
        assert_eq!(result.to_string(), "OK");
        assert_eq!(ctx.current_database(), None);
        assert!(!engine.has_database("shop"));

        let result = run("CREATE TABLE t (id INT)", &mut engine, &mut ctx);
        assert_eq!(result.error, "No database selected");
    }

    #[test]
    fn test_drop_other_database_keeps_selection() {
        let (mut engine, mut ctx) = shop();
        assert!(run("CREATE DATABASE other", &mut engine, &mut ctx).ok);
        assert!(run("DROP DATABASE other", &mut engine, &mut ctx).ok);
        assert_eq!(ctx.current_database(), Some("shop"));
    }

    #[test]
    fn test_create_table_with_foreign_key() {
        let (mut engine, mut ctx) = shop();
        assert!(run("CREATE TABLE users (id INT, name STR)", &mut engine, &mut ctx).ok);
        assert!(run("CREATE TABLE orders (id INT, uid INT FK users(id))", &mut engine, &mut ctx).ok);

        let orders = engine
            .get_database("shop")
            .and_then(|db| db.get_table("orders"))
            .unwrap();
        assert_eq!(
            orders.columns()[1].foreign_keys,
            vec![ForeignKey::new("users", "id")]
        );
    }

    #[test]
    fn test_create_table_rejects_bad_foreign_keys() {
        let (mut engine, mut ctx) = shop();
        assert!(run("CREATE TABLE users (id INT)", &mut engine, &mut ctx).ok);

        let result = run("CREATE TABLE orders (uid INT FK ghosts(id))", &mut engine, &mut ctx);
        assert_eq!(result.error, "Referenced table 'ghosts' does not exist");

        let result = run("CREATE TABLE orders (uid INT FK users(email))", &mut engine, &mut ctx);
        assert_eq!(
            result.error,
            "Referenced column 'email' does not exist in table 'users'"
        );

        let db = engine.get_database("shop").unwrap();
        assert!(!db.has_table("orders"));
    }

    #[test]
    fn test_create_table_self_reference_rejected() {
        let (mut engine, mut ctx) = shop();
        let result = run("CREATE TABLE nodes (id INT, parent INT FK nodes(id))", &mut engine, &mut ctx);
        assert_eq!(result.error, "Referenced table 'nodes' does not exist");
    }

    #[test]
    fn test_create_table_duplicates() {
        let (mut engine, mut ctx) = shop();
        assert!(run("CREATE TABLE t (id INT)", &mut engine, &mut ctx).ok);

        let result = run("CREATE TABLE t (id INT)", &mut engine, &mut ctx);
        assert_eq!(result.error, "Table 't' already exists");

        let result = run("CREATE TABLE u (a INT, a STR)", &mut engine, &mut ctx);
        assert_eq!(result.error, "Duplicate column name 'a'");
    }

    #[test]
    fn test_drop_tables() {
        let (mut engine, mut ctx) = shop();
        assert!(run("CREATE TABLE a (id INT)", &mut engine, &mut ctx).ok);
        assert!(run("CREATE TABLE b (id INT)", &mut engine, &mut ctx).ok);

        assert!(run("DROP TABLE a b c", &mut engine, &mut ctx).ok);
        assert!(engine.get_database("shop").unwrap().table_names().is_empty());
    }
}
