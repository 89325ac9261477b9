//! Command outcome envelope.

use std::fmt;

use crate::parser::{Command, ParseResult};

/// Outcome of executing one command.
///
/// `ok` is false for both parse and execution failures; `error` then holds
/// the message and `result` is empty. On success `result` holds the text
/// produced by the command, which may be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecResult {
    /// Whether the command succeeded.
    pub ok: bool,
    /// Error message when `ok` is false.
    pub error: String,
    /// Result text when `ok` is true.
    pub result: String,
}

impl ExecResult {
    /// A successful outcome with result text.
    pub fn success(result: impl Into<String>) -> Self {
        Self {
            ok: true,
            error: String::new(),
            result: result.into(),
        }
    }

    /// A successful outcome with no result text.
    pub fn empty() -> Self {
        Self::success(String::new())
    }

    /// A failed outcome.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: error.into(),
            result: String::new(),
        }
    }

    /// Renders the text sent back to a client for the command in `parsed`.
    ///
    /// `Error: <message>` on failure. A successful SELECT sends its result
    /// text; every other successful command sends `OK`, even when its
    /// result text carries a row count.
    pub fn reply(&self, parsed: &ParseResult<Command>) -> String {
        if !self.ok {
            format!("Error: {}", self.error)
        } else if matches!(parsed, Ok(command) if command.returns_rows()) {
            self.result.clone()
        } else {
            "OK".to_string()
        }
    }
}

impl fmt::Display for ExecResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.ok {
            write!(f, "Error: {}", self.error)
        } else if self.result.is_empty() {
            f.write_str("OK")
        } else {
            f.write_str(&self.result)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    #[test]
    fn test_reply_text() {
        let create = Parser::parse("CREATE DATABASE shop");
        let update = Parser::parse("UPDATE t SET a = 1");
        let select = Parser::parse("SELECT * FROM t");

        assert_eq!(ExecResult::empty().reply(&create), "OK");
        assert_eq!(ExecResult::success("Updated 2 row(s)").reply(&update), "OK");
        assert_eq!(ExecResult::success("a\n-\n1\n").reply(&select), "a\n-\n1\n");
        assert_eq!(
            ExecResult::failure("Table not found").reply(&select),
            "Error: Table not found"
        );
    }

    #[test]
    fn test_reply_to_parse_error() {
        let parsed = Parser::parse("FROB");
        let result = ExecResult::failure("Unknown or unsupported command");
        assert_eq!(result.reply(&parsed), "Error: Unknown or unsupported command");
    }

    #[test]
    fn test_display_keeps_result_text() {
        assert_eq!(ExecResult::empty().to_string(), "OK");
        assert_eq!(
            ExecResult::success("Deleted 1 row(s) from table t").to_string(),
            "Deleted 1 row(s) from table t"
        );
    }

    #[test]
    fn test_failure_has_no_result() {
        let r = ExecResult::failure("boom");
        assert!(!r.ok);
        assert!(r.result.is_empty());
        assert_eq!(r.to_string(), "Error: boom");
    }
}
