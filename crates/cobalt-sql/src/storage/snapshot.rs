//! JSON snapshots of the whole engine.
//!
//! Document layout:
//!
//! ```text
//! {
//!   "version": 1,
//!   "databases": {
//!     "<db>": {
//!       "name": "<db>",
//!       "tables": {
//!         "<table>": {
//!           "name": "<table>",
//!           "columns": [{"name": "id", "type": "INT", "foreign_keys": []}],
//!           "rows": [[{"Int": 1}, {"Text": "Ann"}, "Null"]]
//!         }
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! Values are externally tagged so each keeps its variant across a round
//! trip; `{"Float": 1.0}` never comes back as an integer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::database::Database;
use super::engine::Engine;
use super::error::{StorageError, StorageResult};

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    databases: &'a BTreeMap<String, Database>,
}

#[derive(Deserialize)]
struct SnapshotOwned {
    version: u32,
    #[serde(default)]
    databases: BTreeMap<String, Database>,
}

/// Encodes the engine as a JSON document.
pub fn save(engine: &Engine) -> StorageResult<serde_json::Value> {
    let doc = serde_json::to_value(SnapshotRef {
        version: SNAPSHOT_VERSION,
        databases: engine.database_map(),
    })?;
    Ok(doc)
}

/// Decodes a JSON document into an engine.
///
/// Rejects unknown versions, name/key mismatches, and rows that do not fit
/// their table's columns.
pub fn load(doc: &serde_json::Value) -> StorageResult<Engine> {
    let snapshot = SnapshotOwned::deserialize(doc)?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(StorageError::UnsupportedVersion(snapshot.version));
    }
    let engine = Engine::from_database_map(snapshot.databases);
    engine.validate()?;
    Ok(engine)
}

/// Encodes the engine as pretty-printed JSON text.
pub fn to_string(engine: &Engine) -> StorageResult<String> {
    Ok(serde_json::to_string_pretty(&save(engine)?)?)
}

/// Decodes JSON text into an engine.
pub fn from_str(text: &str) -> StorageResult<Engine> {
    let doc: serde_json::Value = serde_json::from_str(text)?;
    load(&doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{Row, Value};
    use crate::parser::DataType;
    use crate::storage::{Column, ForeignKey};

    fn sample_engine() -> Engine {
        let mut engine = Engine::new();
        engine.create_database("shop").unwrap();
        engine.create_database("empty").unwrap();

        let db = engine.get_database_mut("shop").unwrap();
        db.create_table(
            "users",
            vec![
                Column::new("id", DataType::Int),
                Column::new("name", DataType::Str),
                Column::new("score", DataType::Float),
                Column::new("active", DataType::Bool),
            ],
        )
        .unwrap();
        db.create_table(
            "orders",
            vec![
                Column::new("id", DataType::Int),
                Column::new("uid", DataType::Int).with_foreign_key(ForeignKey::new("users", "id")),
            ],
        )
        .unwrap();

        let users = db.get_table_mut("users").unwrap();
        users
            .insert(Row::new(vec![
                Value::int(1),
                Value::text("Ann"),
                Value::float(1.0),
                Value::boolean(true),
            ]))
            .unwrap();
        users
            .insert(Row::new(vec![
                Value::int(2),
                Value::Null,
                Value::float(2.5),
                Value::boolean(false),
            ]))
            .unwrap();

        let orders = db.get_table_mut("orders").unwrap();
        orders
            .insert(Row::new(vec![Value::int(10), Value::int(1)]))
            .unwrap();
        engine
    }

    #[test]
    fn test_snapshot_round_trip() {
        let engine = sample_engine();
        let restored = load(&save(&engine).unwrap()).unwrap();
        assert_eq!(restored, engine);

        let score = restored
            .get_database("shop")
            .and_then(|db| db.get_table("users"))
            .map(|t| t.rows()[0].get(2).cloned());
        assert_eq!(score, Some(Some(Value::float(1.0))));
    }

    #[test]
    fn test_snapshot_text_round_trip() {
        let engine = sample_engine();
        let text = to_string(&engine).unwrap();
        assert!(text.contains("\"version\": 1"));
        assert_eq!(from_str(&text).unwrap(), engine);
    }

    #[test]
    fn test_snapshot_document_shape() {
        let doc = save(&sample_engine()).unwrap();
        let orders = &doc["databases"]["shop"]["tables"]["orders"];
        assert_eq!(orders["name"], "orders");
        assert_eq!(orders["columns"][1]["type"], "INT");
        assert_eq!(orders["columns"][1]["foreign_keys"][0]["table"], "users");
        assert_eq!(orders["rows"][0][1]["Int"], 1);
        assert_eq!(doc["databases"]["shop"]["tables"]["users"]["rows"][1][1], "Null");
    }

    #[test]
    fn test_snapshot_empty_engine() {
        let doc = save(&Engine::new()).unwrap();
        assert_eq!(load(&doc).unwrap(), Engine::new());
    }

    #[test]
    fn test_snapshot_rejects_bad_documents() {
        let err = from_str(r#"{"version": 9, "databases": {}}"#).unwrap_err();
        assert_eq!(err, StorageError::UnsupportedVersion(9));

        assert!(matches!(
            from_str("not json").unwrap_err(),
            StorageError::Snapshot(_)
        ));

        let bad_row = r#"{
            "version": 1,
            "databases": {"d": {"name": "d", "tables": {"t": {
                "name": "t",
                "columns": [{"name": "id", "type": "INT", "foreign_keys": []}],
                "rows": [[{"Text": "x"}]]
            }}}}
        }"#;
        assert!(matches!(
            from_str(bad_row).unwrap_err(),
            StorageError::SchemaMismatch(_)
        ));

        let bad_key = r#"{"version": 1, "databases": {"a": {"name": "b", "tables": {}}}}"#;
        assert!(matches!(
            from_str(bad_key).unwrap_err(),
            StorageError::Snapshot(_)
        ));
    }
}
