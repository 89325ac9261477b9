//! Column data types.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{ParseError, ParseResult};
use crate::executor::Value;

/// Declared type of a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataType {
    /// 64-bit signed integer.
    Int,
    /// 64-bit floating point.
    Float,
    /// Boolean.
    Bool,
    /// Text.
    Str,
}

impl DataType {
    /// Parses a type keyword (case-insensitive).
    pub fn parse(keyword: &str) -> ParseResult<Self> {
        match keyword.to_ascii_uppercase().as_str() {
            "INT" => Ok(DataType::Int),
            "FLOAT" => Ok(DataType::Float),
            "STR" => Ok(DataType::Str),
            "BOOL" => Ok(DataType::Bool),
            _ => Err(ParseError::InvalidType(keyword.to_string())),
        }
    }

    /// Returns the canonical keyword for this type.
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Int => "INT",
            DataType::Float => "FLOAT",
            DataType::Bool => "BOOL",
            DataType::Str => "STR",
        }
    }

    /// Returns true if `value` may be stored in a column of this type.
    ///
    /// NULL is compatible with every type.
    pub fn accepts(&self, value: &Value) -> bool {
        match value.data_type() {
            Some(actual) => actual == *self,
            None => true,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_type_keywords() {
        assert_eq!(DataType::parse("INT").unwrap(), DataType::Int);
        assert_eq!(DataType::parse("float").unwrap(), DataType::Float);
        assert_eq!(DataType::parse("Str").unwrap(), DataType::Str);
        assert_eq!(DataType::parse("bool").unwrap(), DataType::Bool);

        let err = DataType::parse("VARCHAR").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid type: VARCHAR. Supported types: INT, FLOAT, STR, BOOL"
        );
    }

    #[test]
    fn test_type_accepts() {
        assert!(DataType::Int.accepts(&Value::int(1)));
        assert!(!DataType::Int.accepts(&Value::text("1")));
        assert!(!DataType::Int.accepts(&Value::float(1.0)));
        assert!(DataType::Str.accepts(&Value::text("x")));
        assert!(DataType::Bool.accepts(&Value::Null));
    }

    #[test]
    fn test_type_serde_names() {
        assert_eq!(serde_json::to_string(&DataType::Str).unwrap(), r#""STR""#);
        let parsed: DataType = serde_json::from_str(r#""FLOAT""#).unwrap();
        assert_eq!(parsed, DataType::Float);
    }
}
