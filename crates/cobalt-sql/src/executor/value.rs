//! Runtime values.
//!
//! This module defines the `Value` type which represents a single scalar
//! stored in a row or produced from a literal in a command.
//!
//! Two notions of equality exist side by side:
//!
//! - `==` (derived `PartialEq`) is structural identity. `Null == Null` and
//!   `Float(1.0) != Int(1)`. Snapshot round trips and tests rely on it.
//! - [`Value::sql_eq`] is the comparison the engine uses for WHERE matching
//!   and foreign-key lookups. NULL never equals anything, not even NULL.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::parser::DataType;

/// A runtime value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit floating point.
    Float(f64),
    /// Boolean value.
    Bool(bool),
    /// Text value.
    Text(String),
    /// NULL value.
    Null,
}

impl Value {
    /// Creates a NULL value.
    pub fn null() -> Self {
        Value::Null
    }

    /// Creates an integer value.
    pub fn int(v: i64) -> Self {
        Value::Int(v)
    }

    /// Creates a float value.
    pub fn float(v: f64) -> Self {
        Value::Float(v)
    }

    /// Creates a boolean value.
    pub fn boolean(v: bool) -> Self {
        Value::Bool(v)
    }

    /// Creates a text value.
    pub fn text(v: impl Into<String>) -> Self {
        Value::Text(v.into())
    }

    /// Returns true if this value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the declared column type this value's variant belongs to.
    ///
    /// NULL has no type of its own and returns `None`.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Int(_) => Some(DataType::Int),
            Value::Float(_) => Some(DataType::Float),
            Value::Bool(_) => Some(DataType::Bool),
            Value::Text(_) => Some(DataType::Str),
            Value::Null => None,
        }
    }

    /// Engine equality: same variant and equal payload.
    ///
    /// Values of different variants are never equal and NULL is never
    /// equal to anything, including another NULL.
    pub fn sql_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            _ => false,
        }
    }

    /// Engine ordering: true when `self` sorts strictly before `other`.
    ///
    /// Only defined for two non-null values of the same variant; every
    /// other pairing returns false.
    pub fn sql_lt(&self, other: &Value) -> bool {
        self.sql_cmp(other) == Some(Ordering::Less)
    }

    fn sql_cmp(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            // Debug keeps the fractional part so 1.0 does not read as an integer
            Value::Float(v) => write!(f, "{:?}", v),
            Value::Bool(b) => write!(f, "{}", if *b { "true" } else { "false" }),
            Value::Text(s) => write!(f, "{}", s),
            Value::Null => write!(f, "NULL"),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_display() {
        assert_eq!(Value::int(42).to_string(), "42");
        assert_eq!(Value::int(-7).to_string(), "-7");
        assert_eq!(Value::float(2.5).to_string(), "2.5");
        assert_eq!(Value::float(1.0).to_string(), "1.0");
        assert_eq!(Value::boolean(true).to_string(), "true");
        assert_eq!(Value::boolean(false).to_string(), "false");
        assert_eq!(Value::text("hello").to_string(), "hello");
        assert_eq!(Value::null().to_string(), "NULL");
    }

    #[test]
    fn test_value_sql_eq_same_variant() {
        assert!(Value::int(1).sql_eq(&Value::int(1)));
        assert!(!Value::int(1).sql_eq(&Value::int(2)));
        assert!(Value::text("a").sql_eq(&Value::text("a")));
        assert!(Value::boolean(true).sql_eq(&Value::boolean(true)));
        assert!(Value::float(0.5).sql_eq(&Value::float(0.5)));
    }

    #[test]
    fn test_value_sql_eq_cross_variant() {
        assert!(!Value::int(1).sql_eq(&Value::float(1.0)));
        assert!(!Value::int(1).sql_eq(&Value::text("1")));
        assert!(!Value::boolean(true).sql_eq(&Value::int(1)));
    }

    #[test]
    fn test_value_null_never_equal() {
        assert!(!Value::null().sql_eq(&Value::null()));
        assert!(!Value::null().sql_eq(&Value::int(0)));
        assert!(!Value::int(0).sql_eq(&Value::null()));

        // structural identity still holds
        assert_eq!(Value::null(), Value::null());
    }

    #[test]
    fn test_value_sql_lt() {
        assert!(Value::int(1).sql_lt(&Value::int(2)));
        assert!(!Value::int(2).sql_lt(&Value::int(1)));
        assert!(!Value::int(1).sql_lt(&Value::int(1)));
        assert!(Value::text("a").sql_lt(&Value::text("b")));
        assert!(Value::boolean(false).sql_lt(&Value::boolean(true)));

        assert!(!Value::int(1).sql_lt(&Value::float(2.0)));
        assert!(!Value::null().sql_lt(&Value::int(1)));
        assert!(!Value::int(1).sql_lt(&Value::null()));
    }

    #[test]
    fn test_value_data_type() {
        assert_eq!(Value::int(1).data_type(), Some(DataType::Int));
        assert_eq!(Value::text("x").data_type(), Some(DataType::Str));
        assert_eq!(Value::null().data_type(), None);
    }
}
