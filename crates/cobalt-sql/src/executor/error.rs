//! Execution error types.

use thiserror::Error;

use crate::parser::DataType;
use crate::storage::StorageError;

/// Errors raised while executing a command.
///
/// The display text of each variant is what clients see after `Error: `.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExecutionError {
    /// No current database for a table-level command.
    #[error("No database selected")]
    NoDatabaseSelected,

    /// Database does not exist.
    #[error("Database not found")]
    DatabaseNotFound,

    /// Table does not exist in the current database.
    #[error("Table not found")]
    TableNotFound,

    /// Column does not exist in the target table.
    #[error("Column '{0}' not found in table")]
    ColumnNotFound(String),

    /// Explicit INSERT column list names a column twice.
    #[error("Column '{0}' specified more than once")]
    DuplicateColumn(String),

    /// Explicit INSERT column list and value list differ in length.
    #[error("Column count doesn't match value count")]
    ColumnCountMismatch,

    /// Positional INSERT value list differs from the table's column count.
    #[error("Value count doesn't match column count")]
    ValueCountMismatch,

    /// Value variant does not match the column's declared type.
    #[error("Type mismatch for column '{column}': expected {expected}, got value '{value}'")]
    TypeMismatch {
        /// Column name.
        column: String,
        /// Declared type.
        expected: DataType,
        /// Offending value, rendered.
        value: String,
    },

    /// Foreign key in CREATE TABLE names a missing table.
    #[error("Referenced table '{0}' does not exist")]
    ReferencedTableMissing(String),

    /// Foreign key in CREATE TABLE names a missing column.
    #[error("Referenced column '{column}' does not exist in table '{table}'")]
    ReferencedColumnMissing {
        /// Referenced table.
        table: String,
        /// Missing column.
        column: String,
    },

    /// Referenced table vanished after the constraint was declared.
    #[error("Referenced table '{0}' not found for foreign key constraint")]
    ReferencedTableGone(String),

    /// Written value is absent from the referenced column.
    #[error(
        "Foreign key constraint violation: value '{value}' does not exist in referenced table '{table}' column '{column}'"
    )]
    ForeignKeyViolation {
        /// Offending value, rendered.
        value: String,
        /// Referenced table.
        table: String,
        /// Referenced column.
        column: String,
    },

    /// SET item without `=`.
    #[error("Invalid SET clause: {0}")]
    InvalidSetClause(String),

    /// WHERE tokens that contain no `col = value` triple.
    #[error("Invalid WHERE clause: {0}")]
    InvalidWhereClause(String),

    /// UPDATE would change a value another table references.
    #[error(
        "Cannot update row: value '{value}' in column '{column}' is referenced by table '{referencing_table}' column '{referencing_column}'"
    )]
    UpdateReferenced {
        /// Current value, rendered.
        value: String,
        /// Column being updated.
        column: String,
        /// Table holding the foreign key.
        referencing_table: String,
        /// Foreign-key column.
        referencing_column: String,
    },

    /// Unfiltered DELETE on a table other tables reference.
    #[error(
        "Cannot delete all rows: table '{table}' is referenced by table '{referencing_table}' column '{referencing_column}'"
    )]
    DeleteAllReferenced {
        /// Target table.
        table: String,
        /// Table holding the foreign key.
        referencing_table: String,
        /// Foreign-key column.
        referencing_column: String,
    },

    /// DELETE of a row another table references.
    #[error(
        "Cannot delete row: Referenced by table '{referencing_table}' column '{referencing_column}'"
    )]
    DeleteReferenced {
        /// Table holding the foreign key.
        referencing_table: String,
        /// Foreign-key column.
        referencing_column: String,
    },

    /// Storage-layer failure.
    #[error("{0}")]
    Storage(#[from] StorageError),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for execution operations.
pub type ExecutionResult<T> = Result<T, ExecutionError>;
