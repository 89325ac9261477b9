//! SELECT.

use tracing::debug;

use super::engine::current_database;
use super::{ExecutionError, ExecutionResult, Executor, SessionContext};
use crate::parser::{Projection, SelectStatement};
use crate::storage::Engine;

impl Executor {
    /// Executes SELECT and renders the result as text.
    ///
    /// Output is a header of column names joined by ` | `, a separator of
    /// dashes as wide as each name joined by `-+-`, then one line per row.
    /// Every line ends with a newline. The WHERE clause is not applied.
    pub fn execute_select(
        stmt: &SelectStatement,
        engine: &Engine,
        ctx: &SessionContext,
    ) -> ExecutionResult<String> {
        let db = current_database(engine, ctx)?;
        let table = db
            .get_table(&stmt.table)
            .ok_or(ExecutionError::TableNotFound)?;

        let selected: Vec<(&str, usize)> = match &stmt.projection {
            Projection::All => table
                .columns()
                .iter()
                .enumerate()
                .map(|(i, c)| (c.name.as_str(), i))
                .collect(),
            Projection::Columns(names) => names
                .iter()
                .map(|name| {
                    table
                        .column_index(name)
                        .map(|i| (name.as_str(), i))
                        .ok_or_else(|| ExecutionError::ColumnNotFound(name.clone()))
                })
                .collect::<ExecutionResult<_>>()?,
        };

        if !stmt.where_clause.is_empty() {
            debug!(table = %stmt.table, "SELECT ignores WHERE clause");
        }

        let header: Vec<&str> = selected.iter().map(|(name, _)| *name).collect();
        let separator: Vec<String> = header.iter().map(|name| "-".repeat(name.len())).collect();

        let mut out = String::new();
        out.push_str(&header.join(" | "));
        out.push('\n');
        out.push_str(&separator.join("-+-"));
        out.push('\n');

        for row in table.rows() {
            let cells: Vec<String> = selected
                .iter()
                .map(|(_, idx)| row.get(*idx).map(ToString::to_string).unwrap_or_default())
                .collect();
            out.push_str(&cells.join(" | "));
            out.push('\n');
        }

        debug!(table = %stmt.table, rows = table.num_rows(), "Selected rows");
        Ok(out)
    }
}
