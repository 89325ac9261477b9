//! WHERE clause interpretation for UPDATE and DELETE.
//!
//! The clause arrives as a flat token list. It is read as stepped
//! `(column, "=", value)` triples; tokens that do not start a triple (such
//! as `AND` or `OR`) are skipped. A row matches when ANY condition holds.

use super::{ExecutionError, ExecutionResult, Row, Value};
use crate::parser::parse_literal;
use crate::storage::Table;

/// Resolved equality conditions, ORed together.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Filter {
    conditions: Vec<(usize, Value)>,
}

impl Filter {
    /// Builds a filter from WHERE tokens against `table`'s columns.
    ///
    /// Empty tokens give a filter matching every row. Non-empty tokens must
    /// contain at least one triple, and every referenced column must exist.
    pub fn from_tokens(table: &Table, tokens: &[String]) -> ExecutionResult<Self> {
        let mut conditions = Vec::new();
        let mut i = 0;
        while i < tokens.len() {
            if i + 2 < tokens.len() && tokens[i + 1] == "=" {
                let column = &tokens[i];
                let idx = table
                    .column_index(column)
                    .ok_or_else(|| ExecutionError::ColumnNotFound(column.clone()))?;
                conditions.push((idx, parse_literal(&tokens[i + 2])));
                i += 3;
            } else {
                i += 1;
            }
        }

        if !tokens.is_empty() && conditions.is_empty() {
            return Err(ExecutionError::InvalidWhereClause(tokens.join(" ")));
        }
        Ok(Self { conditions })
    }

    /// Returns true if the filter has no conditions.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Returns true if the row satisfies any condition, or there are none.
    pub fn matches(&self, row: &Row) -> bool {
        self.is_empty()
            || self
                .conditions
                .iter()
                .any(|(idx, value)| row.get(*idx).is_some_and(|v| v.sql_eq(value)))
    }
}
