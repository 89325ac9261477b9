//! Column definitions and foreign keys.

use serde::{Deserialize, Serialize};

use crate::parser::DataType;

/// A foreign-key target: a named column of a named table.
///
/// References are resolved by name at check time; nothing is pinned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Referenced table.
    pub table: String,
    /// Referenced column.
    pub column: String,
}

impl ForeignKey {
    /// Creates a new foreign-key target.
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }
}

/// A table column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name, unique within its table.
    pub name: String,
    /// Declared type.
    #[serde(rename = "type")]
    pub data_type: DataType,
    /// Foreign-key constraints on this column.
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKey>,
}

impl Column {
    /// Creates a new column without constraints.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            foreign_keys: Vec::new(),
        }
    }

    /// Adds a foreign-key constraint.
    pub fn with_foreign_key(mut self, fk: ForeignKey) -> Self {
        self.foreign_keys.push(fk);
        self
    }

    /// Returns true if any foreign key on this column targets `table.column`.
    pub fn references(&self, table: &str, column: &str) -> bool {
        self.foreign_keys
            .iter()
            .any(|fk| fk.table == table && fk.column == column)
    }
}
