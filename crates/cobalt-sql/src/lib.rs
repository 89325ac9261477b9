//! # cobalt-sql
//!
//! Command language, storage model and executor for Cobalt.
//!
//! This crate implements:
//! - Parsing of the flat, single-table command language
//! - The in-memory storage hierarchy (engine, databases, tables, rows)
//! - Command execution with type checking and foreign-key integrity
//! - JSON snapshots of the full engine state
//!
//! # Usage
//!
//! ```
//! use cobalt_sql::executor::{Executor, SessionContext};
//! use cobalt_sql::parser::Parser;
//! use cobalt_sql::storage::Engine;
//!
//! let mut engine = Engine::new();
//! let mut ctx = SessionContext::new();
//!
//! for sql in ["CREATE DATABASE shop", "USE shop", "CREATE TABLE users (id INT, name STR)"] {
//!     let result = Executor::execute(&Parser::parse(sql), &mut engine, &mut ctx);
//!     assert!(result.ok);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Command tokenizer and parser
pub mod parser;

/// Command execution
pub mod executor;

/// In-memory storage model and snapshots
pub mod storage;
