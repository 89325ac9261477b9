//! Databases: named collections of tables.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::column::Column;
use super::error::{StorageError, StorageResult};
use super::table::Table;

/// A named collection of tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Database {
    name: String,
    #[serde(default)]
    tables: BTreeMap<String, Table>,
}

impl Database {
    /// Creates an empty database.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: BTreeMap::new(),
        }
    }

    /// Returns the database name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Creates a table. Fails if the name is taken or columns repeat.
    pub fn create_table(&mut self, name: &str, columns: Vec<Column>) -> StorageResult<()> {
        if self.tables.contains_key(name) {
            return Err(StorageError::TableExists(name.to_string()));
        }
        let table = Table::new(name, columns)?;
        self.tables.insert(name.to_string(), table);
        Ok(())
    }

    /// Drops a table. Returns false if it did not exist.
    pub fn drop_table(&mut self, name: &str) -> bool {
        self.tables.remove(name).is_some()
    }

    /// Returns the named table.
    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Returns the named table mutably.
    pub fn get_table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.get_mut(name)
    }

    /// Returns true if the table exists.
    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Iterates over all tables, ordered by name.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    /// Returns all table names, sorted.
    pub fn table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    pub(crate) fn validate(&self) -> StorageResult<()> {
        for (key, table) in &self.tables {
            if key != table.name() {
                return Err(StorageError::Snapshot(format!(
                    "table key '{}' does not match table name '{}'",
                    key,
                    table.name()
                )));
            }
            table.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::DataType;

    #[test]
    fn test_database_tables() {
        let mut db = Database::new("shop");
        db.create_table("users", vec![Column::new("id", DataType::Int)])
            .unwrap();
        db.create_table("orders", vec![Column::new("id", DataType::Int)])
            .unwrap();

        assert!(db.has_table("users"));
        assert_eq!(db.table_names(), vec!["orders", "users"]);

        let err = db
            .create_table("users", vec![Column::new("x", DataType::Str)])
            .unwrap_err();
        assert_eq!(err.to_string(), "Table 'users' already exists");

        assert!(db.drop_table("users"));
        assert!(!db.drop_table("users"));
        assert!(db.get_table("users").is_none());
    }
}
