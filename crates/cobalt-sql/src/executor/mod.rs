//! Command executor.
//!
//! Applies parsed commands to the in-memory [`Engine`](crate::storage::Engine)
//! on behalf of a session.
//!
//! # Architecture
//!
//! The executor consists of:
//!
//! - **Value**: Runtime scalar values (integer, float, boolean, text, NULL)
//! - **Row**: A fixed-length list of values
//! - **Executor**: Stateless dispatch plus one handler per command kind
//! - **SessionContext**: The session's current-database selection
//! - **ExecResult**: The `{ok, error, result}` envelope returned to callers
//!
//! # Integrity
//!
//! Each command validates everything it can before mutating anything.
//! UPDATE and DELETE are the exception: they apply row by row and stop at
//! the first row that another table still references.
//!
//! # Example
//!
//! ```
//! use cobalt_sql::executor::{Executor, SessionContext};
//! use cobalt_sql::parser::Parser;
//! use cobalt_sql::storage::Engine;
//!
//! let mut engine = Engine::new();
//! let mut ctx = SessionContext::new();
//! let result = Executor::execute(&Parser::parse("USE missing"), &mut engine, &mut ctx);
//! assert_eq!(result.to_string(), "Error: Database not found");
//! ```

mod ddl;
mod dml;
mod engine;
mod error;
mod filter;
mod integrity;
mod query;
mod result;
mod row;
mod value;

pub use engine::{Executor, SessionContext};
pub use error::{ExecutionError, ExecutionResult};
pub use filter::Filter;
pub use integrity::{check_foreign_keys, find_row_reference, find_value_reference, Reference};
pub use result::ExecResult;
pub use row::Row;
pub use value::Value;
