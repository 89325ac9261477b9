//! Text scanning helpers shared by the statement parsers.
//!
//! The command language is flat: statements are cut apart at keywords,
//! parentheses and commas rather than through a token grammar. Every helper
//! here is quote-aware, so separators inside `"..."` or `'...'` are ignored.

/// Removes surrounding whitespace and any trailing `;` terminators.
pub fn strip_terminator(sql: &str) -> &str {
    let mut text = sql.trim();
    while let Some(rest) = text.strip_suffix(';') {
        text = rest.trim_end();
    }
    text
}

/// Splits off the first whitespace-delimited word.
///
/// Returns the word and the remaining text with leading whitespace removed.
pub fn next_word(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(pos) => (&text[..pos], text[pos..].trim_start()),
        None => (text, ""),
    }
}

/// Finds a standalone, case-insensitive keyword outside of quotes.
///
/// A match must be delimited on both sides by the start/end of the text,
/// whitespace, a parenthesis, a comma or a semicolon.
pub fn find_keyword(text: &str, keyword: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut quote: Option<char> = None;

    for (i, c) in text.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        if c == '"' || c == '\'' {
            quote = Some(c);
            continue;
        }

        let end = i + keyword.len();
        if end > text.len() || !text.is_char_boundary(end) {
            continue;
        }
        if !text[i..end].eq_ignore_ascii_case(keyword) {
            continue;
        }
        let before_ok = i == 0 || is_delimiter(bytes[i - 1]);
        let after_ok = end == text.len() || is_delimiter(bytes[end]);
        if before_ok && after_ok {
            return Some(i);
        }
    }
    None
}

fn is_delimiter(b: u8) -> bool {
    b.is_ascii_whitespace() || matches!(b, b'(' | b')' | b',' | b';')
}

/// Returns the text between the first `(` and its matching `)`.
///
/// The second element is whatever follows the closing parenthesis. Returns
/// `None` if there is no opening parenthesis or it is never closed.
pub fn parenthesized(text: &str) -> Option<(&str, &str)> {
    let open = text.find('(')?;
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for (i, c) in text[open..].char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    let close = open + i;
                    return Some((&text[open + 1..close], &text[close + 1..]));
                }
            }
            _ => {}
        }
    }
    None
}

/// Splits text on `separator` at parenthesis depth zero, outside quotes.
///
/// Each piece is trimmed. Blank input yields no pieces.
pub fn split_top_level(text: &str, separator: char) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for c in text.chars() {
        if let Some(q) = quote {
            current.push(c);
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => {
                quote = Some(c);
                current.push(c);
            }
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            c if c == separator && depth == 0 => {
                parts.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    parts.push(current.trim().to_string());
    parts
}

/// Tokenizes a WHERE clause.
///
/// Splits on whitespace, emits `=` as a token of its own and keeps quoted
/// strings (quotes included) as single tokens, so `id=1`, `id = 1` and
/// `id= 1` all yield `["id", "=", "1"]`.
pub fn tokenize_clause(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for c in text.chars() {
        if let Some(q) = quote {
            current.push(c);
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => {
                quote = Some(c);
                current.push(c);
            }
            '=' => {
                flush(&mut tokens, &mut current);
                tokens.push("=".to_string());
            }
            c if c.is_whitespace() => flush(&mut tokens, &mut current),
            _ => current.push(c),
        }
    }
    flush(&mut tokens, &mut current);
    tokens
}

fn flush(tokens: &mut Vec<String>, current: &mut String) {
    if !current.is_empty() {
        tokens.push(std::mem::take(current));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_terminator() {
        assert_eq!(strip_terminator("  SELECT * FROM t ;; "), "SELECT * FROM t");
        assert_eq!(strip_terminator("USE db"), "USE db");
        assert_eq!(strip_terminator(" ; "), "");
    }

    #[test]
    fn test_next_word() {
        assert_eq!(next_word("  CREATE   TABLE t"), ("CREATE", "TABLE t"));
        assert_eq!(next_word("USE"), ("USE", ""));
        assert_eq!(next_word(""), ("", ""));
    }

    #[test]
    fn test_find_keyword() {
        assert_eq!(find_keyword("a, b FROM t", "FROM"), Some(5));
        assert_eq!(find_keyword("a,b from t", "FROM"), Some(4));
        assert_eq!(find_keyword("fromage FROM t", "FROM"), Some(8));
        assert_eq!(find_keyword("t SET a='x WHERE y' WHERE id=1", "WHERE"), Some(20));
        assert_eq!(find_keyword("users(id)", "FROM"), None);
    }

    #[test]
    fn test_parenthesized() {
        let (inner, rest) = parenthesized("t (id INT, uid INT FK users(id)) tail").unwrap();
        assert_eq!(inner, "id INT, uid INT FK users(id)");
        assert_eq!(rest, " tail");

        assert!(parenthesized("no parens").is_none());
        assert!(parenthesized("(unclosed").is_none());
    }

    #[test]
    fn test_split_top_level() {
        assert_eq!(
            split_top_level("id INT, uid INT FK users(id)", ','),
            vec!["id INT", "uid INT FK users(id)"]
        );
        assert_eq!(
            split_top_level(r#"1, "a, b", 'c'"#, ','),
            vec!["1", r#""a, b""#, "'c'"]
        );
        assert!(split_top_level("   ", ',').is_empty());
    }

    #[test]
    fn test_tokenize_clause() {
        assert_eq!(tokenize_clause("id=1"), vec!["id", "=", "1"]);
        assert_eq!(tokenize_clause("id = 1"), vec!["id", "=", "1"]);
        assert_eq!(
            tokenize_clause(r#"name = "Ann Lee" OR id= 2"#),
            vec!["name", "=", r#""Ann Lee""#, "OR", "id", "=", "2"]
        );
    }
}
