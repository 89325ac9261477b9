//! Command representation and per-statement parsing.
//!
//! INSERT and CREATE TABLE operands are fully typed at parse time. SET and
//! WHERE clauses stay as flat string lists and are interpreted by the
//! executor against the target table's schema.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::lexer::{find_keyword, next_word, parenthesized, split_top_level, tokenize_clause};
use super::literal::{parse_literal, unquote};
use super::{DataType, ParseError, ParseResult};
use crate::executor::Value;
use crate::storage::ForeignKey;

/// A parsed command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// CREATE DATABASE statement.
    CreateDatabase(CreateDatabaseStatement),
    /// DROP DATABASE statement.
    DropDatabase(DropDatabaseStatement),
    /// CREATE TABLE statement.
    CreateTable(CreateTableStatement),
    /// DROP TABLE statement.
    DropTable(DropTableStatement),
    /// INSERT statement.
    Insert(InsertStatement),
    /// SELECT statement.
    Select(SelectStatement),
    /// UPDATE statement.
    Update(UpdateStatement),
    /// DELETE statement.
    Delete(DeleteStatement),
    /// USE statement.
    Use(UseStatement),
}

impl Command {
    /// Returns the statement keyword(s), for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Command::CreateDatabase(_) => "CREATE DATABASE",
            Command::DropDatabase(_) => "DROP DATABASE",
            Command::CreateTable(_) => "CREATE TABLE",
            Command::DropTable(_) => "DROP TABLE",
            Command::Insert(_) => "INSERT",
            Command::Select(_) => "SELECT",
            Command::Update(_) => "UPDATE",
            Command::Delete(_) => "DELETE",
            Command::Use(_) => "USE",
        }
    }

    /// Returns true if the command's result text is sent to clients.
    pub fn returns_rows(&self) -> bool {
        matches!(self, Command::Select(_))
    }

    /// Returns true if executing this command can modify the engine.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Command::Select(_) | Command::Use(_))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

// ============================================================================
// Databases
// ============================================================================

/// CREATE DATABASE statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateDatabaseStatement {
    /// Database name.
    pub name: String,
}

impl CreateDatabaseStatement {
    /// Parses the text following `CREATE DATABASE`.
    pub fn parse(rest: &str) -> ParseResult<Self> {
        Ok(Self {
            name: identifier(rest, ParseError::NoDatabaseName)?,
        })
    }
}

/// DROP DATABASE statement. Several databases may be dropped at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropDatabaseStatement {
    /// Database names.
    pub names: Vec<String>,
}

impl DropDatabaseStatement {
    /// Parses the text following `DROP DATABASE`.
    pub fn parse(rest: &str) -> ParseResult<Self> {
        Ok(Self {
            names: name_list(rest, ParseError::NoDatabaseName)?,
        })
    }
}

/// USE statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UseStatement {
    /// Database to select.
    pub database: String,
}

impl UseStatement {
    /// Parses the text following `USE`.
    pub fn parse(rest: &str) -> ParseResult<Self> {
        Ok(Self {
            database: identifier(rest, ParseError::NoDatabaseName)?,
        })
    }
}

// ============================================================================
// Tables
// ============================================================================

/// CREATE TABLE statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTableStatement {
    /// Table name.
    pub name: String,
    /// Column definitions, in declaration order.
    pub columns: Vec<ColumnDef>,
}

impl CreateTableStatement {
    /// Parses the text following `CREATE TABLE`.
    ///
    /// Grammar: `<name> ( <col> <TYPE> [FK <table>(<col>)], ... )`
    pub fn parse(rest: &str) -> ParseResult<Self> {
        let rest = rest.trim();
        if rest.is_empty() || rest.starts_with('(') {
            return Err(ParseError::NoTableName);
        }
        let open = rest.find('(').ok_or(ParseError::ExpectedParenAfterTableName)?;
        let name = identifier(&rest[..open], ParseError::NoTableName)?;

        let (body, trailing) = parenthesized(rest)
            .ok_or_else(|| ParseError::Syntax("Unterminated column list".to_string()))?;
        reject_trailing(trailing)?;

        let columns = split_top_level(body, ',')
            .iter()
            .map(|def| ColumnDef::parse(def))
            .collect::<ParseResult<Vec<_>>>()?;
        if columns.is_empty() {
            return Err(ParseError::NoColumns);
        }

        Ok(Self { name, columns })
    }
}

/// Column definition inside CREATE TABLE.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column name.
    pub name: String,
    /// Declared type.
    pub data_type: DataType,
    /// Foreign-key target, if declared with `FK table(column)`.
    pub references: Option<ForeignKey>,
}

impl ColumnDef {
    /// Parses `<col> <TYPE>` or `<col> <TYPE> FK <table>(<col>)`.
    pub fn parse(def: &str) -> ParseResult<Self> {
        let tokens: Vec<&str> = def.split_whitespace().collect();
        if tokens.len() < 2 {
            return Err(ParseError::InvalidColumnDefinition(def.to_string()));
        }

        let name = tokens[0].to_string();
        let data_type = DataType::parse(tokens[1])?;

        let references = match tokens.get(2) {
            None => None,
            Some(kw) if kw.eq_ignore_ascii_case("FK") => {
                // the reference may be written with spaces: users ( id )
                let target: String = tokens[3..].concat();
                Some(parse_reference(&target)?)
            }
            Some(_) => return Err(ParseError::InvalidColumnDefinition(def.to_string())),
        };

        Ok(Self {
            name,
            data_type,
            references,
        })
    }
}

fn parse_reference(target: &str) -> ParseResult<ForeignKey> {
    let invalid = || ParseError::InvalidForeignKey(target.to_string());

    let open = target.find('(').ok_or_else(invalid)?;
    let close = target.rfind(')').ok_or_else(invalid)?;
    if close < open || close + 1 != target.len() {
        return Err(invalid());
    }

    let table = &target[..open];
    let column = &target[open + 1..close];
    if table.is_empty() || column.is_empty() || column.contains(|c: char| c == '(' || c == ')') {
        return Err(invalid());
    }
    Ok(ForeignKey::new(table, column))
}

/// DROP TABLE statement. Several tables may be dropped at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropTableStatement {
    /// Table names.
    pub names: Vec<String>,
}

impl DropTableStatement {
    /// Parses the text following `DROP TABLE`.
    pub fn parse(rest: &str) -> ParseResult<Self> {
        Ok(Self {
            names: name_list(rest, ParseError::NoTableName)?,
        })
    }
}

// ============================================================================
// Rows
// ============================================================================

/// INSERT statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertStatement {
    /// Target table.
    pub table: String,
    /// Explicit column list; `None` means positional by declaration order.
    pub columns: Option<Vec<String>>,
    /// Values to insert.
    pub values: Vec<Value>,
}

impl InsertStatement {
    /// Parses the text following `INSERT`.
    ///
    /// Grammar: `INTO <table> [(<col>, ...)] VALUES (<val>, ...)`
    pub fn parse(rest: &str) -> ParseResult<Self> {
        let (into, rest) = next_word(rest);
        if !into.eq_ignore_ascii_case("INTO") {
            return Err(ParseError::ExpectedInto);
        }

        let values_pos = find_keyword(rest, "VALUES").ok_or_else(|| {
            if rest.trim().is_empty() {
                ParseError::NoTableName
            } else {
                ParseError::ExpectedValues
            }
        })?;
        let target = rest[..values_pos].trim();
        let tail = rest[values_pos + "VALUES".len()..].trim();

        let (table, columns) = match target.find('(') {
            Some(open) => {
                let table = identifier(&target[..open], ParseError::NoTableName)?;
                let (list, trailing) = parenthesized(target)
                    .ok_or_else(|| ParseError::Syntax("Unterminated column list".to_string()))?;
                reject_trailing(trailing)?;
                let columns = split_top_level(list, ',');
                if columns.is_empty() || columns.iter().any(|c| c.is_empty()) {
                    return Err(ParseError::NoColumns);
                }
                (table, Some(columns))
            }
            None => (identifier(target, ParseError::NoTableName)?, None),
        };

        if !tail.starts_with('(') {
            return Err(ParseError::ExpectedParenAfterValues);
        }
        let (list, trailing) = parenthesized(tail)
            .ok_or_else(|| ParseError::Syntax("Unterminated value list".to_string()))?;
        reject_trailing(trailing)?;

        let values = split_top_level(list, ',')
            .iter()
            .map(|token| parse_literal(strip_value_token(token)))
            .collect();

        Ok(Self {
            table,
            columns,
            values,
        })
    }
}

fn strip_value_token(token: &str) -> &str {
    let token = token.trim();
    if unquote(token).is_some() {
        token
    } else {
        token
            .trim_end_matches(|c: char| matches!(c, ',' | ';' | ')'))
            .trim_end()
    }
}

/// Columns selected by a SELECT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Projection {
    /// `*`: every column in declaration order.
    All,
    /// Named columns, in the order written.
    Columns(Vec<String>),
}

/// SELECT statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectStatement {
    /// Selected columns.
    pub projection: Projection,
    /// Source table.
    pub table: String,
    /// WHERE tokens. Accepted but not applied as a filter.
    pub where_clause: Vec<String>,
}

impl SelectStatement {
    /// Parses the text following `SELECT`.
    pub fn parse(rest: &str) -> ParseResult<Self> {
        let from = find_keyword(rest, "FROM").ok_or(ParseError::ExpectedFrom)?;

        let list = rest[..from].trim();
        let projection = if list == "*" {
            Projection::All
        } else {
            let columns: Vec<String> = split_top_level(list, ',')
                .into_iter()
                .filter(|c| !c.is_empty())
                .collect();
            if columns.is_empty() {
                return Err(ParseError::NoColumns);
            }
            Projection::Columns(columns)
        };

        let (table, where_clause) = table_and_where(&rest[from + "FROM".len()..])?;
        Ok(Self {
            projection,
            table,
            where_clause,
        })
    }
}

/// UPDATE statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStatement {
    /// Target table.
    pub table: String,
    /// SET items, each normalized to `col=value`.
    pub assignments: Vec<String>,
    /// WHERE tokens.
    pub where_clause: Vec<String>,
}

impl UpdateStatement {
    /// Parses the text following `UPDATE`.
    ///
    /// Grammar: `<table> SET <col>=<val>[, ...] [WHERE <col> = <val> ...]`
    pub fn parse(rest: &str) -> ParseResult<Self> {
        let (table, rest) = next_word(rest);
        if table.is_empty() || table.eq_ignore_ascii_case("SET") {
            return Err(ParseError::MissingUpdateTable);
        }

        let (set, rest) = next_word(rest);
        if !set.eq_ignore_ascii_case("SET") {
            return Err(ParseError::ExpectedSet);
        }

        let (set_text, where_clause) = match find_keyword(rest, "WHERE") {
            Some(pos) => (&rest[..pos], where_tokens(&rest[pos + "WHERE".len()..])?),
            None => (rest, Vec::new()),
        };

        let assignments: Vec<String> = split_top_level(set_text, ',')
            .into_iter()
            .filter(|item| !item.is_empty())
            .map(|item| match item.find('=') {
                Some(eq) => format!("{}={}", item[..eq].trim(), item[eq + 1..].trim()),
                None => item,
            })
            .collect();
        if assignments.is_empty() {
            return Err(ParseError::NoUpdateColumns);
        }

        Ok(Self {
            table: table.to_string(),
            assignments,
            where_clause,
        })
    }
}

/// DELETE statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteStatement {
    /// Target table.
    pub table: String,
    /// WHERE tokens; empty deletes every row.
    pub where_clause: Vec<String>,
}

impl DeleteStatement {
    /// Parses the text following `DELETE`.
    pub fn parse(rest: &str) -> ParseResult<Self> {
        let (from, rest) = next_word(rest);
        if !from.eq_ignore_ascii_case("FROM") {
            return Err(ParseError::ExpectedFrom);
        }
        let (table, where_clause) = table_and_where(rest)?;
        Ok(Self {
            table,
            where_clause,
        })
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn table_and_where(text: &str) -> ParseResult<(String, Vec<String>)> {
    match find_keyword(text, "WHERE") {
        Some(pos) => Ok((
            identifier(&text[..pos], ParseError::NoTableName)?,
            where_tokens(&text[pos + "WHERE".len()..])?,
        )),
        None => Ok((identifier(text, ParseError::NoTableName)?, Vec::new())),
    }
}

fn where_tokens(text: &str) -> ParseResult<Vec<String>> {
    let tokens = tokenize_clause(text);
    if tokens.is_empty() {
        return Err(ParseError::EmptyWhere);
    }
    Ok(tokens)
}

/// A single identifier. Blank text yields `missing`.
fn identifier(text: &str, missing: ParseError) -> ParseResult<String> {
    let (name, extra) = next_word(text);
    if name.is_empty() {
        return Err(missing);
    }
    if !extra.is_empty() {
        return Err(ParseError::Syntax(format!(
            "Unexpected '{}' after '{}'",
            extra, name
        )));
    }
    Ok(name.to_string())
}

fn name_list(rest: &str, missing: ParseError) -> ParseResult<Vec<String>> {
    let names: Vec<String> = rest
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if names.is_empty() {
        return Err(missing);
    }
    Ok(names)
}

fn reject_trailing(trailing: &str) -> ParseResult<()> {
    let trailing = trailing.trim();
    if trailing.is_empty() {
        Ok(())
    } else {
        Err(ParseError::Syntax(format!("Unexpected '{}'", trailing)))
    }
}
