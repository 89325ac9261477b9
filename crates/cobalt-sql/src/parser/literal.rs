//! Value literal parsing.

use crate::executor::Value;

/// Strips one pair of matching surrounding quotes, if present.
pub fn unquote(token: &str) -> Option<&str> {
    for q in ['"', '\''] {
        if token.len() >= 2 && token.starts_with(q) && token.ends_with(q) {
            return Some(&token[1..token.len() - 1]);
        }
    }
    None
}

/// Converts a literal token into a [`Value`].
///
/// Quoted tokens always become text. Unquoted tokens are tried as an
/// integer, then a finite float, then `TRUE`/`FALSE`, then `NULL`
/// (keywords case-insensitive); anything else is kept as text.
pub fn parse_literal(token: &str) -> Value {
    let token = token.trim();
    if let Some(inner) = unquote(token) {
        return Value::Text(inner.to_string());
    }

    if let Ok(i) = token.parse::<i64>() {
        return Value::Int(i);
    }
    // words like "inf" and "NaN" parse as floats but stay text
    if token.bytes().any(|b| b.is_ascii_digit()) {
        if let Ok(f) = token.parse::<f64>() {
            if f.is_finite() {
                return Value::Float(f);
            }
        }
    }
    if token.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if token.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if token.eq_ignore_ascii_case("null") {
        return Value::Null;
    }
    Value::Text(token.to_string())
}
