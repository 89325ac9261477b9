//! In-memory storage model.
//!
//! Ownership is strictly nested: the engine owns databases, databases own
//! tables, tables own their columns and rows.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                    Engine                     │
//! │        (databases, ordered by name)           │
//! └──────────────────────────────────────────────┘
//!                        │
//!                        ▼
//! ┌──────────────────────────────────────────────┐
//! │                   Database                    │
//! │          (tables, ordered by name)            │
//! └──────────────────────────────────────────────┘
//!                        │
//!                        ▼
//! ┌──────────────────────────────────────────────┐
//! │                    Table                      │
//! │  ┌─────────────────────┐ ┌────────────────┐  │
//! │  │       Columns       │ │      Rows      │  │
//! │  │ (type, foreign keys)│ │ (insert order) │  │
//! │  └─────────────────────┘ └────────────────┘  │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Foreign keys are plain `(table, column)` names resolved by lookup when
//! they are checked. The [`snapshot`] module converts the whole tree to and
//! from a JSON document.

mod column;
mod database;
mod engine;
mod error;
pub mod snapshot;
mod table;

pub use column::{Column, ForeignKey};
pub use database::Database;
pub use engine::Engine;
pub use error::{StorageError, StorageResult};
pub use table::Table;
