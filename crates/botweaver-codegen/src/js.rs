//! Helpers for embedding data into generated JavaScript.
//!
//! User-supplied text never reaches the output unquoted: every value goes through
//! a JSON encoder, which is also valid JavaScript literal syntax.

use serde::Serialize;

/// A double-quoted JavaScript string literal for `s`.
pub fn str_lit(s: &str) -> String {
    // Serialising a &str can't fail.
    let encoded = serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string());
    escape_line_separators(encoded)
}

/// Pretty-printed JSON usable as a JavaScript expression.
pub fn json_expr<T: Serialize>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value).map(escape_line_separators)
}

/// U+2028/U+2029 are legal in JSON strings but terminate lines in older JS parsers.
fn escape_line_separators(s: String) -> String {
    if s.contains(['\u{2028}', '\u{2029}']) {
        s.replace('\u{2028}', "\\u2028").replace('\u{2029}', "\\u2029")
    } else {
        s
    }
}

/// Indent every line after the first by `spaces`.
pub fn indent_tail(s: &str, spaces: usize) -> String {
    let pad = " ".repeat(spaces);
    s.lines()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 || line.is_empty() {
                line.to_string()
            } else {
                format!("{pad}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_and_backticks_are_contained() {
        let lit = str_lit("it's `${process.exit()}` \"quoted\"\n");
        assert_eq!(lit, r#""it's `${process.exit()}` \"quoted\"\n""#);
    }

    #[test]
    fn line_separators_are_escaped() {
        assert_eq!(str_lit("a\u{2028}b"), r#""a\u2028b""#);
    }

    #[test]
    fn indent_skips_first_line() {
        assert_eq!(indent_tail("{\n  \"a\": 1\n}", 2), "{\n    \"a\": 1\n  }");
    }
}
