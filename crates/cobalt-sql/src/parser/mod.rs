//! Command parser for Cobalt.
//!
//! The command language is a flat, single-table subset of SQL. Keywords are
//! case-insensitive, identifiers are case-sensitive, and a trailing `;` is
//! optional.
//!
//! # Supported commands
//!
//! - `CREATE DATABASE <name>` / `DROP DATABASE <name> [<name> ...]`
//! - `USE <name>`
//! - `CREATE TABLE <name> (<col> <TYPE> [FK <table>(<col>)], ...)`
//! - `DROP TABLE <name> [<name> ...]`
//! - `INSERT INTO <table> [(<col>, ...)] VALUES (<val>, ...)`
//! - `SELECT <col>, ... | * FROM <table> [WHERE ...]`
//! - `UPDATE <table> SET <col>=<val>, ... [WHERE <col> = <val> ...]`
//! - `DELETE FROM <table> [WHERE <col> = <val> ...]`
//!
//! # Usage
//!
//! ```
//! use cobalt_sql::parser::{Command, Parser};
//!
//! let command = Parser::parse("SELECT id, name FROM users").unwrap();
//! assert!(matches!(command, Command::Select(_)));
//! ```

use thiserror::Error;

mod lexer;
mod literal;
mod statement;
mod types;

pub use literal::parse_literal;
pub use statement::*;
pub use types::*;

/// Errors that can occur during parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Empty query.
    #[error("Empty query")]
    EmptyQuery,

    /// Leading keyword is not a known command.
    #[error("Unknown or unsupported command")]
    UnknownCommand,

    /// Database name missing.
    #[error("No database name")]
    NoDatabaseName,

    /// Table name missing.
    #[error("No table name")]
    NoTableName,

    /// UPDATE without a table name.
    #[error("Missing table name in UPDATE statement")]
    MissingUpdateTable,

    /// CREATE TABLE without a column list.
    #[error("Expected '(' after table name")]
    ExpectedParenAfterTableName,

    /// Unknown column type keyword.
    #[error("Invalid type: {0}. Supported types: INT, FLOAT, STR, BOOL")]
    InvalidType(String),

    /// Malformed column definition.
    #[error("Invalid column definition: {0}")]
    InvalidColumnDefinition(String),

    /// Malformed `FK table(column)` target.
    #[error("Invalid foreign key reference: {0}")]
    InvalidForeignKey(String),

    /// Empty column list.
    #[error("No columns")]
    NoColumns,

    /// INSERT without INTO.
    #[error("Expected INTO")]
    ExpectedInto,

    /// INSERT without VALUES.
    #[error("Expected VALUES")]
    ExpectedValues,

    /// VALUES not followed by a parenthesized list.
    #[error("Expected '(' after VALUES")]
    ExpectedParenAfterValues,

    /// SELECT or DELETE without FROM.
    #[error("Expected FROM")]
    ExpectedFrom,

    /// UPDATE without SET.
    #[error("Expected SET keyword in UPDATE statement")]
    ExpectedSet,

    /// UPDATE with nothing after SET.
    #[error("No columns specified for update")]
    NoUpdateColumns,

    /// WHERE keyword with no condition.
    #[error("Expected condition after WHERE")]
    EmptyWhere,

    /// Any other malformed input.
    #[error("Syntax error: {0}")]
    Syntax(String),
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Command parser.
///
/// Stateless; every call parses exactly one command.
pub struct Parser;

impl Parser {
    /// Parses one command.
    ///
    /// Surrounding whitespace and trailing `;` are ignored.
    pub fn parse(sql: &str) -> ParseResult<Command> {
        let text = lexer::strip_terminator(sql);
        if text.is_empty() {
            return Err(ParseError::EmptyQuery);
        }

        let (keyword, rest) = lexer::next_word(text);
        match keyword.to_ascii_uppercase().as_str() {
            "CREATE" => {
                let (object, rest) = lexer::next_word(rest);
                match object.to_ascii_uppercase().as_str() {
                    "DATABASE" => Ok(Command::CreateDatabase(CreateDatabaseStatement::parse(rest)?)),
                    "TABLE" => Ok(Command::CreateTable(CreateTableStatement::parse(rest)?)),
                    _ => Err(ParseError::UnknownCommand),
                }
            }
            "DROP" => {
                let (object, rest) = lexer::next_word(rest);
                match object.to_ascii_uppercase().as_str() {
                    "DATABASE" => Ok(Command::DropDatabase(DropDatabaseStatement::parse(rest)?)),
                    "TABLE" => Ok(Command::DropTable(DropTableStatement::parse(rest)?)),
                    _ => Err(ParseError::UnknownCommand),
                }
            }
            "INSERT" => Ok(Command::Insert(InsertStatement::parse(rest)?)),
            "SELECT" => Ok(Command::Select(SelectStatement::parse(rest)?)),
            "UPDATE" => Ok(Command::Update(UpdateStatement::parse(rest)?)),
            "DELETE" => Ok(Command::Delete(DeleteStatement::parse(rest)?)),
            "USE" => Ok(Command::Use(UseStatement::parse(rest)?)),
            _ => Err(ParseError::UnknownCommand),
        }
    }
}
