//! Row-level commands: INSERT, UPDATE and DELETE.

use tracing::debug;

use super::engine::current_database_mut;
use super::filter::Filter;
use super::integrity::{check_foreign_keys, find_row_reference, find_value_reference};
use super::{ExecutionError, ExecutionResult, Executor, Row, SessionContext, Value};
use crate::parser::{parse_literal, DeleteStatement, InsertStatement, UpdateStatement};
use crate::storage::{Column, Engine};

impl Executor {
    /// Executes INSERT.
    ///
    /// Arity, types and foreign keys are all checked before the row is
    /// appended, so a failed INSERT leaves the table untouched. Columns left
    /// out of an explicit column list are stored as NULL.
    pub fn execute_insert(
        stmt: &InsertStatement,
        engine: &mut Engine,
        ctx: &SessionContext,
    ) -> ExecutionResult<String> {
        let db = current_database_mut(engine, ctx)?;
        let table = db
            .get_table(&stmt.table)
            .ok_or(ExecutionError::TableNotFound)?;
        let columns = table.columns();

        let values = match &stmt.columns {
            Some(names) => {
                if names.len() != stmt.values.len() {
                    return Err(ExecutionError::ColumnCountMismatch);
                }
                let mut values = vec![Value::Null; columns.len()];
                let mut assigned = vec![false; columns.len()];
                for (name, value) in names.iter().zip(&stmt.values) {
                    let idx = table
                        .column_index(name)
                        .ok_or_else(|| ExecutionError::ColumnNotFound(name.clone()))?;
                    if std::mem::replace(&mut assigned[idx], true) {
                        return Err(ExecutionError::DuplicateColumn(name.clone()));
                    }
                    values[idx] = value.clone();
                }
                values
            }
            None => {
                if stmt.values.len() != columns.len() {
                    return Err(ExecutionError::ValueCountMismatch);
                }
                stmt.values.clone()
            }
        };

        for (column, value) in columns.iter().zip(&values) {
            check_type(column, value)?;
        }
        for (column, value) in columns.iter().zip(&values) {
            check_foreign_keys(db, column, value)?;
        }

        let table = db
            .get_table_mut(&stmt.table)
            .ok_or(ExecutionError::TableNotFound)?;
        table.insert(Row::new(values))?;
        debug!(table = %stmt.table, rows = table.num_rows(), "Inserted row");
        Ok(String::new())
    }

    /// Executes UPDATE.
    ///
    /// SET items are validated up front. Matching rows are then updated one
    /// at a time in row order; a row whose current value is referenced by
    /// another table aborts the command, leaving earlier rows updated.
    pub fn execute_update(
        stmt: &UpdateStatement,
        engine: &mut Engine,
        ctx: &SessionContext,
    ) -> ExecutionResult<String> {
        let db = current_database_mut(engine, ctx)?;
        let table = db
            .get_table(&stmt.table)
            .ok_or(ExecutionError::TableNotFound)?;

        let mut updates = Vec::with_capacity(stmt.assignments.len());
        for item in &stmt.assignments {
            let (name, raw) = item
                .split_once('=')
                .ok_or_else(|| ExecutionError::InvalidSetClause(item.clone()))?;
            let name = name.trim();
            let idx = table
                .column_index(name)
                .ok_or_else(|| ExecutionError::ColumnNotFound(name.to_string()))?;
            let column = &table.columns()[idx];
            let value = parse_literal(raw);
            check_type(column, &value)?;
            check_foreign_keys(db, column, &value)?;
            updates.push((idx, column.name.clone(), value));
        }

        let filter = Filter::from_tokens(table, &stmt.where_clause)?;
        let matched: Vec<usize> = table
            .rows()
            .iter()
            .enumerate()
            .filter(|(_, row)| filter.matches(row))
            .map(|(i, _)| i)
            .collect();

        let mut updated = 0;
        for row_idx in matched {
            let table = db
                .get_table(&stmt.table)
                .ok_or(ExecutionError::TableNotFound)?;
            let row = &table.rows()[row_idx];
            for (col_idx, name, _) in &updates {
                let current = row.get(*col_idx).cloned().unwrap_or(Value::Null);
                if let Some(reference) = find_value_reference(db, &stmt.table, name, &current) {
                    return Err(ExecutionError::UpdateReferenced {
                        value: current.to_string(),
                        column: name.clone(),
                        referencing_table: reference.table,
                        referencing_column: reference.column,
                    });
                }
            }

            let table = db
                .get_table_mut(&stmt.table)
                .ok_or(ExecutionError::TableNotFound)?;
            for (col_idx, _, value) in &updates {
                table.set_value(row_idx, *col_idx, value.clone())?;
            }
            updated += 1;
        }

        debug!(table = %stmt.table, updated, "Updated rows");
        Ok(format!("Updated {} row(s)", updated))
    }

    /// Executes DELETE.
    ///
    /// Without WHERE, every row goes, provided no other table references any
    /// of them. With WHERE, matching rows are removed one at a time; a
    /// referenced row aborts the command, leaving earlier rows removed.
    pub fn execute_delete(
        stmt: &DeleteStatement,
        engine: &mut Engine,
        ctx: &SessionContext,
    ) -> ExecutionResult<String> {
        let db = current_database_mut(engine, ctx)?;
        let table = db
            .get_table(&stmt.table)
            .ok_or(ExecutionError::TableNotFound)?;

        if stmt.where_clause.is_empty() {
            for row in table.rows() {
                if let Some(reference) = find_row_reference(db, &stmt.table, table.columns(), row) {
                    return Err(ExecutionError::DeleteAllReferenced {
                        table: stmt.table.clone(),
                        referencing_table: reference.table,
                        referencing_column: reference.column,
                    });
                }
            }
            db.get_table_mut(&stmt.table)
                .ok_or(ExecutionError::TableNotFound)?
                .clear();
            debug!(table = %stmt.table, "Deleted all rows");
            return Ok(format!("Deleted all rows from table {}", stmt.table));
        }

        let filter = Filter::from_tokens(table, &stmt.where_clause)?;
        let mut deleted = 0;
        let mut idx = 0;
        loop {
            let table = db
                .get_table(&stmt.table)
                .ok_or(ExecutionError::TableNotFound)?;
            let Some(row) = table.rows().get(idx) else {
                break;
            };
            if !filter.matches(row) {
                idx += 1;
                continue;
            }
            if let Some(reference) = find_row_reference(db, &stmt.table, table.columns(), row) {
                return Err(ExecutionError::DeleteReferenced {
                    referencing_table: reference.table,
                    referencing_column: reference.column,
                });
            }
            db.get_table_mut(&stmt.table)
                .ok_or(ExecutionError::TableNotFound)?
                .remove_row(idx);
            deleted += 1;
        }

        debug!(table = %stmt.table, deleted, "Deleted rows");
        Ok(format!("Deleted {} row(s) from table {}", deleted, stmt.table))
    }
}

fn check_type(column: &Column, value: &Value) -> ExecutionResult<()> {
    if column.data_type.accepts(value) {
        Ok(())
    } else {
        Err(ExecutionError::TypeMismatch {
            column: column.name.clone(),
            expected: column.data_type,
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::executor::{ExecResult, Executor, SessionContext, Value};
    use crate::parser::Parser;
    use crate::storage::{Engine, Table};

    fn run(sql: &str, engine: &mut Engine, ctx: &mut SessionContext) -> ExecResult {
        Executor::execute(&Parser::parse(sql), engine, ctx)
    }

    fn run_ok(sql: &str, engine: &mut Engine, ctx: &mut SessionContext) -> String {
        let result = run(sql, engine, ctx);
        assert!(result.ok, "{sql}: {}", result.error);
        result.result
    }

    fn table<'a>(engine: &'a Engine, name: &str) -> &'a Table {
        engine
            .get_database("shop")
            .and_then(|db| db.get_table(name))
            .unwrap()
    }

    fn shop() -> (Engine, SessionContext) {
        let mut engine = Engine::new();
        let mut ctx = SessionContext::new();
        run_ok("CREATE DATABASE shop", &mut engine, &mut ctx);
        run_ok("USE shop", &mut engine, &mut ctx);
        run_ok(
            "CREATE TABLE users (id INT, name STR, score FLOAT, active BOOL)",
            &mut engine,
            &mut ctx,
        );
        run_ok(
            "CREATE TABLE orders (id INT, uid INT FK users(id))",
            &mut engine,
            &mut ctx,
        );
        (engine, ctx)
    }

    #[test]
    fn test_insert_positional() {
        let (mut engine, mut ctx) = shop();
        let text = run_ok(
            r#"INSERT INTO users VALUES (1, "Ann", 2.5, true)"#,
            &mut engine,
            &mut ctx,
        );
        assert!(text.is_empty());

        let users = table(&engine, "users");
        assert_eq!(users.num_rows(), 1);
        assert_eq!(
            users.rows()[0].values(),
            &[
                Value::int(1),
                Value::text("Ann"),
                Value::float(2.5),
                Value::boolean(true)
            ]
        );
    }

    #[test]
    fn test_insert_explicit_columns_fills_nulls() {
        let (mut engine, mut ctx) = shop();
        run_ok("INSERT INTO users (name, id) VALUES ('Bo', 2)", &mut engine, &mut ctx);

        let users = table(&engine, "users");
        assert_eq!(
            users.rows()[0].values(),
            &[Value::int(2), Value::text("Bo"), Value::Null, Value::Null]
        );
    }

    #[test]
    fn test_insert_arity_errors() {
        let (mut engine, mut ctx) = shop();
        let result = run("INSERT INTO users VALUES (1, 'Ann')", &mut engine, &mut ctx);
        assert_eq!(result.error, "Value count doesn't match column count");

        let result = run("INSERT INTO users (id, name) VALUES (1)", &mut engine, &mut ctx);
        assert_eq!(result.error, "Column count doesn't match value count");

        let result = run("INSERT INTO users (id, email) VALUES (1, 'x')", &mut engine, &mut ctx);
        assert_eq!(result.error, "Column 'email' not found in table");

        let result = run("INSERT INTO ghosts VALUES (1)", &mut engine, &mut ctx);
        assert_eq!(result.error, "Table not found");

        assert_eq!(table(&engine, "users").num_rows(), 0);
    }

    #[test]
    fn test_insert_duplicate_column() {
        let (mut engine, mut ctx) = shop();
        let result = run("INSERT INTO users (id, id) VALUES (1, 2)", &mut engine, &mut ctx);
        assert!(!result.ok);
        assert_eq!(result.error, "Column 'id' specified more than once");

        let result = run(
            "INSERT INTO users (name, id, name) VALUES ('a', 1, 'b')",
            &mut engine,
            &mut ctx,
        );
        assert_eq!(result.error, "Column 'name' specified more than once");
        assert_eq!(table(&engine, "users").num_rows(), 0);
    }

    #[test]
    fn test_insert_type_mismatch() {
        let (mut engine, mut ctx) = shop();
        let result = run(
            "INSERT INTO users VALUES ('one', 'Ann', 1.5, true)",
            &mut engine,
            &mut ctx,
        );
        assert_eq!(
            result.error,
            "Type mismatch for column 'id': expected INT, got value 'one'"
        );

        let result = run("INSERT INTO users VALUES (1, 'Ann', 1, true)", &mut engine, &mut ctx);
        assert_eq!(
            result.error,
            "Type mismatch for column 'score': expected FLOAT, got value '1'"
        );
        assert_eq!(table(&engine, "users").num_rows(), 0);

        run_ok("INSERT INTO users VALUES (NULL, NULL, NULL, NULL)", &mut engine, &mut ctx);
        assert_eq!(table(&engine, "users").num_rows(), 1);
    }

    #[test]
    fn test_insert_foreign_key() {
        let (mut engine, mut ctx) = shop();
        let result = run("INSERT INTO orders VALUES (1, 99)", &mut engine, &mut ctx);
        assert_eq!(
            result.error,
            "Foreign key constraint violation: value '99' does not exist in referenced table 'users' column 'id'"
        );
        assert_eq!(table(&engine, "orders").num_rows(), 0);

        run_ok("INSERT INTO users VALUES (99, 'Zed', 0.0, false)", &mut engine, &mut ctx);
        run_ok("INSERT INTO orders VALUES (1, 99)", &mut engine, &mut ctx);
        run_ok("INSERT INTO orders VALUES (2, NULL)", &mut engine, &mut ctx);
        assert_eq!(table(&engine, "orders").num_rows(), 2);
    }

    #[test]
    fn test_update_rows() {
        let (mut engine, mut ctx) = shop();
        run_ok("INSERT INTO users VALUES (1, 'Ann', 1.0, true)", &mut engine, &mut ctx);
        run_ok("INSERT INTO users VALUES (2, 'Bob', 2.0, true)", &mut engine, &mut ctx);
        run_ok("INSERT INTO users VALUES (3, 'Cy', 3.0, true)", &mut engine, &mut ctx);

        let text = run_ok(
            "UPDATE users SET active=false, score = 0.5 WHERE id = 1 OR id = 3",
            &mut engine,
            &mut ctx,
        );
        assert_eq!(text, "Updated 2 row(s)");

        let users = table(&engine, "users");
        assert_eq!(users.rows()[0].get(3), Some(&Value::boolean(false)));
        assert_eq!(users.rows()[1].get(3), Some(&Value::boolean(true)));
        assert_eq!(users.rows()[2].get(2), Some(&Value::float(0.5)));

        let text = run_ok("UPDATE users SET name='X'", &mut engine, &mut ctx);
        assert_eq!(text, "Updated 3 row(s)");

        let text = run_ok("UPDATE users SET name='Y' WHERE id=42", &mut engine, &mut ctx);
        assert_eq!(text, "Updated 0 row(s)");
    }

    #[test]
    fn test_update_validation_errors() {
        let (mut engine, mut ctx) = shop();
        run_ok("INSERT INTO users VALUES (1, 'Ann', 1.0, true)", &mut engine, &mut ctx);

        let result = run("UPDATE users SET id='x'", &mut engine, &mut ctx);
        assert_eq!(
            result.error,
            "Type mismatch for column 'id': expected INT, got value 'x'"
        );

        let result = run("UPDATE users SET email='x'", &mut engine, &mut ctx);
        assert_eq!(result.error, "Column 'email' not found in table");

        let result = run("UPDATE users SET name", &mut engine, &mut ctx);
        assert_eq!(result.error, "Invalid SET clause: name");

        let result = run("UPDATE users SET name='B' WHERE age = 3", &mut engine, &mut ctx);
        assert_eq!(result.error, "Column 'age' not found in table");

        let result = run("UPDATE users SET name='B' WHERE id > 3", &mut engine, &mut ctx);
        assert_eq!(result.error, "Invalid WHERE clause: id > 3");

        let result = run("UPDATE orders SET uid=5", &mut engine, &mut ctx);
        assert_eq!(
            result.error,
            "Foreign key constraint violation: value '5' does not exist in referenced table 'users' column 'id'"
        );

        assert_eq!(table(&engine, "users").rows()[0].get(1), Some(&Value::text("Ann")));
    }

    #[test]
    fn test_update_referenced_value_partial() {
        let (mut engine, mut ctx) = shop();
        run_ok("INSERT INTO users VALUES (1, 'Ann', 1.0, true)", &mut engine, &mut ctx);
        run_ok("INSERT INTO users VALUES (2, 'Bob', 2.0, true)", &mut engine, &mut ctx);
        run_ok("INSERT INTO orders VALUES (10, 2)", &mut engine, &mut ctx);

        let result = run("UPDATE users SET id=7", &mut engine, &mut ctx);
        assert_eq!(
            result.error,
            "Cannot update row: value '2' in column 'id' is referenced by table 'orders' column 'uid'"
        );

        // the first row was already updated when the second one failed
        let users = table(&engine, "users");
        assert_eq!(users.rows()[0].get(0), Some(&Value::int(7)));
        assert_eq!(users.rows()[1].get(0), Some(&Value::int(2)));

        // columns nobody references can still change
        run_ok("UPDATE users SET name='B' WHERE id=2", &mut engine, &mut ctx);
    }

    #[test]
    fn test_delete_all() {
        let (mut engine, mut ctx) = shop();
        run_ok("INSERT INTO users VALUES (1, 'Ann', 1.0, true)", &mut engine, &mut ctx);
        run_ok("INSERT INTO orders VALUES (10, 1)", &mut engine, &mut ctx);

        let result = run("DELETE FROM users", &mut engine, &mut ctx);
        assert_eq!(
            result.error,
            "Cannot delete all rows: table 'users' is referenced by table 'orders' column 'uid'"
        );
        assert_eq!(table(&engine, "users").num_rows(), 1);

        let text = run_ok("DELETE FROM orders", &mut engine, &mut ctx);
        assert_eq!(text, "Deleted all rows from table orders");
        let text = run_ok("DELETE FROM users", &mut engine, &mut ctx);
        assert_eq!(text, "Deleted all rows from table users");
        assert_eq!(table(&engine, "users").num_rows(), 0);
    }

    #[test]
    fn test_delete_where() {
        let (mut engine, mut ctx) = shop();
        run_ok("INSERT INTO users VALUES (1, 'Ann', 1.0, true)", &mut engine, &mut ctx);
        run_ok("INSERT INTO users VALUES (2, 'Bob', 2.0, false)", &mut engine, &mut ctx);
        run_ok("INSERT INTO users VALUES (3, 'Ann', 3.0, true)", &mut engine, &mut ctx);

        let text = run_ok("DELETE FROM users WHERE name = 'Ann'", &mut engine, &mut ctx);
        assert_eq!(text, "Deleted 2 row(s) from table users");

        let users = table(&engine, "users");
        assert_eq!(users.num_rows(), 1);
        assert_eq!(users.rows()[0].get(0), Some(&Value::int(2)));

        let text = run_ok("DELETE FROM users WHERE id = 9", &mut engine, &mut ctx);
        assert_eq!(text, "Deleted 0 row(s) from table users");
    }

    #[test]
    fn test_delete_referenced_row() {
        let (mut engine, mut ctx) = shop();
        run_ok("INSERT INTO users VALUES (1, 'Ann', 1.0, true)", &mut engine, &mut ctx);
        run_ok("INSERT INTO users VALUES (2, 'Bob', 2.0, true)", &mut engine, &mut ctx);
        run_ok("INSERT INTO orders VALUES (10, 2)", &mut engine, &mut ctx);

        let result = run("DELETE FROM users WHERE id=1 OR id=2", &mut engine, &mut ctx);
        assert_eq!(
            result.error,
            "Cannot delete row: Referenced by table 'orders' column 'uid'"
        );
        // row 1 went before row 2 was found to be referenced
        assert_eq!(table(&engine, "users").num_rows(), 1);

        run_ok("DELETE FROM orders WHERE uid=2", &mut engine, &mut ctx);
        let text = run_ok("DELETE FROM users WHERE id=2", &mut engine, &mut ctx);
        assert_eq!(text, "Deleted 1 row(s) from table users");
    }

    #[test]
    fn test_delete_invalid_where() {
        let (mut engine, mut ctx) = shop();
        let result = run("DELETE FROM users WHERE id", &mut engine, &mut ctx);
        assert_eq!(result.error, "Invalid WHERE clause: id");
    }
}
