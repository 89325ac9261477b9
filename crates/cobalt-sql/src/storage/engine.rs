//! The engine: root of the storage hierarchy.

use std::collections::BTreeMap;

use super::database::Database;
use super::error::{StorageError, StorageResult};

/// All databases known to one process.
///
/// The engine holds no notion of a "current" database; that selection is
/// per-session state kept by the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Engine {
    databases: BTreeMap<String, Database>,
}

impl Engine {
    /// Creates an empty engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a database. Fails if the name is taken.
    pub fn create_database(&mut self, name: &str) -> StorageResult<()> {
        if self.databases.contains_key(name) {
            return Err(StorageError::DatabaseExists(name.to_string()));
        }
        self.databases.insert(name.to_string(), Database::new(name));
        Ok(())
    }

    /// Drops a database. Returns false if it did not exist.
    pub fn drop_database(&mut self, name: &str) -> bool {
        self.databases.remove(name).is_some()
    }

    /// Returns the named database.
    pub fn get_database(&self, name: &str) -> Option<&Database> {
        self.databases.get(name)
    }

    /// Returns the named database mutably.
    pub fn get_database_mut(&mut self, name: &str) -> Option<&mut Database> {
        self.databases.get_mut(name)
    }

    /// Returns true if the database exists.
    pub fn has_database(&self, name: &str) -> bool {
        self.databases.contains_key(name)
    }

    /// Iterates over all databases, ordered by name.
    pub fn databases(&self) -> impl Iterator<Item = &Database> {
        self.databases.values()
    }

    /// Returns all database names, sorted.
    pub fn database_names(&self) -> Vec<String> {
        self.databases.keys().cloned().collect()
    }

    /// Returns true if no database exists.
    pub fn is_empty(&self) -> bool {
        self.databases.is_empty()
    }

    pub(crate) fn from_database_map(databases: BTreeMap<String, Database>) -> Self {
        Self { databases }
    }

    pub(crate) fn database_map(&self) -> &BTreeMap<String, Database> {
        &self.databases
    }

    pub(crate) fn validate(&self) -> StorageResult<()> {
        for (key, db) in &self.databases {
            if key != db.name() {
                return Err(StorageError::Snapshot(format!(
                    "database key '{}' does not match database name '{}'",
                    key,
                    db.name()
                )));
            }
            db.validate()?;
        }
        Ok(())
    }
}
