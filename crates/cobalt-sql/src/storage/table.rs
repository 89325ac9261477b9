//! Tables: an ordered column list plus rows in insertion order.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::column::Column;
use super::error::{StorageError, StorageResult};
use crate::executor::{Row, Value};

/// A table.
///
/// Every stored row has exactly one value per column and each non-null
/// value matches its column's declared type. There is no primary key and no
/// index; insertion order is the only ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    #[serde(default)]
    rows: Vec<Row>,
}

impl Table {
    /// Creates an empty table. Column names must be unique.
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> StorageResult<Self> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(StorageError::DuplicateColumn(column.name.clone()));
            }
        }
        Ok(Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        })
    }

    /// Returns the table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the columns in declaration order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns the position of the named column.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Returns the rows in insertion order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Returns the number of rows.
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Appends a row after checking its arity and value types.
    pub fn insert(&mut self, row: Row) -> StorageResult<()> {
        self.check_row(&row)?;
        self.rows.push(row);
        Ok(())
    }

    /// Overwrites one cell after checking the value's type.
    pub fn set_value(&mut self, row: usize, column: usize, value: Value) -> StorageResult<()> {
        let col = self.columns.get(column).ok_or_else(|| {
            StorageError::Internal(format!("column index {} out of range", column))
        })?;
        if !col.data_type.accepts(&value) {
            return Err(StorageError::SchemaMismatch(format!(
                "column '{}' expects {}, got '{}'",
                col.name, col.data_type, value
            )));
        }
        let target = self
            .rows
            .get_mut(row)
            .ok_or_else(|| StorageError::Internal(format!("row index {} out of range", row)))?;
        target.set(column, value);
        Ok(())
    }

    /// Removes and returns the row at `index`.
    pub fn remove_row(&mut self, index: usize) -> Option<Row> {
        if index < self.rows.len() {
            Some(self.rows.remove(index))
        } else {
            None
        }
    }

    /// Removes every row.
    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Returns true if some row holds a value equal to `value` in `column`.
    ///
    /// Uses engine equality, so a NULL `value` never matches.
    pub fn contains_value(&self, column: usize, value: &Value) -> bool {
        self.rows
            .iter()
            .any(|row| row.get(column).is_some_and(|v| v.sql_eq(value)))
    }

    /// Checks that a row fits this table's columns.
    pub fn check_row(&self, row: &Row) -> StorageResult<()> {
        if row.num_columns() != self.columns.len() {
            return Err(StorageError::SchemaMismatch(format!(
                "table '{}' has {} columns, row has {} values",
                self.name,
                self.columns.len(),
                row.num_columns()
            )));
        }
        for (column, value) in self.columns.iter().zip(row.iter()) {
            if !column.data_type.accepts(value) {
                return Err(StorageError::SchemaMismatch(format!(
                    "column '{}' expects {}, got '{}'",
                    column.name, column.data_type, value
                )));
            }
        }
        Ok(())
    }

    /// Re-checks every stored row. Used after decoding a snapshot.
    pub(crate) fn validate(&self) -> StorageResult<()> {
        let mut seen = HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.name.as_str()) {
                return Err(StorageError::DuplicateColumn(column.name.clone()));
            }
        }
        self.rows.iter().try_for_each(|row| self.check_row(row))
    }
}
