//! Referential-integrity checks.
//!
//! Foreign keys are resolved by name on every check and every lookup is a
//! linear scan over the rows involved. There are no secondary indexes.

use tracing::debug;

use super::{ExecutionError, ExecutionResult, Row, Value};
use crate::storage::{Column, Database};

/// A foreign-key column in another table that holds a given value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Table holding the foreign key.
    pub table: String,
    /// Foreign-key column.
    pub column: String,
}

/// Checks that a value written to `column` satisfies its foreign keys.
///
/// NULL is always accepted. Otherwise every referenced column must already
/// contain an equal value.
pub fn check_foreign_keys(db: &Database, column: &Column, value: &Value) -> ExecutionResult<()> {
    if value.is_null() {
        return Ok(());
    }

    for fk in &column.foreign_keys {
        let referenced = db
            .get_table(&fk.table)
            .ok_or_else(|| ExecutionError::ReferencedTableGone(fk.table.clone()))?;

        let exists = referenced
            .column_index(&fk.column)
            .is_some_and(|idx| referenced.contains_value(idx, value));
        if !exists {
            debug!(
                column = %column.name,
                table = %fk.table,
                value = %value,
                "Foreign key lookup failed"
            );
            return Err(ExecutionError::ForeignKeyViolation {
                value: value.to_string(),
                table: fk.table.clone(),
                column: fk.column.clone(),
            });
        }
    }
    Ok(())
}

/// Finds another table whose foreign key on `table.column` holds `value`.
///
/// The table itself is never consulted, and NULL never matches.
pub fn find_value_reference(
    db: &Database,
    table: &str,
    column: &str,
    value: &Value,
) -> Option<Reference> {
    db.tables()
        .filter(|other| other.name() != table)
        .find_map(|other| {
            other
                .columns()
                .iter()
                .enumerate()
                .filter(|(_, c)| c.references(table, column))
                .find(|(idx, _)| other.contains_value(*idx, value))
                .map(|(_, c)| Reference {
                    table: other.name().to_string(),
                    column: c.name.clone(),
                })
        })
}

/// Finds a reference from another table to any value of `row`.
pub fn find_row_reference(
    db: &Database,
    table: &str,
    columns: &[Column],
    row: &Row,
) -> Option<Reference> {
    columns
        .iter()
        .zip(row.iter())
        .find_map(|(column, value)| find_value_reference(db, table, &column.name, value))
}
