// Value tuple lexing and literal coercion.
// A tuple interior like `1, 'it''s', NULL, NOW()` is split into raw literals,
// then each literal becomes exactly one typed Value. Neither step fails:
// malformed input degrades to text or a shorter value list.

use crate::parser::Value;
use unicode_general_category::{GeneralCategory, get_general_category};

/// One literal as it appears in the source tuple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawLiteral<'a> {
    /// The `NULL` keyword (any case).
    Null,
    /// A quoted string. `raw` includes the delimiting quotes; when the
    /// literal never terminates it runs to the end of the tuple.
    Quoted {
        raw: &'a str,
        quote: char,
        terminated: bool,
    },
    /// Anything unquoted: numbers, identifiers, function calls.
    Bareword(&'a str),
}

/// Split one tuple interior (text between its outer parentheses) into literals.
pub fn lex_tuple(interior: &str) -> Vec<RawLiteral<'_>> {
    let bytes = interior.as_bytes();
    let mut literals = Vec::new();
    let mut pos = 0;

    loop {
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if pos >= bytes.len() {
            break;
        }

        if is_null_keyword(&interior[pos..]) {
            literals.push(RawLiteral::Null);
            pos = past_next_comma(bytes, pos + 4);
            continue;
        }

        let b = bytes[pos];
        if b == b'\'' || b == b'"' {
            match closing_quote(bytes, pos) {
                Some(end) => {
                    literals.push(RawLiteral::Quoted {
                        raw: &interior[pos..=end],
                        quote: char::from(b),
                        terminated: true,
                    });
                    pos = past_next_comma(bytes, end + 1);
                    continue;
                }
                None => {
                    literals.push(RawLiteral::Quoted {
                        raw: &interior[pos..],
                        quote: char::from(b),
                        terminated: false,
                    });
                    break;
                }
            }
        }

        let end = bareword_end(bytes, pos);
        literals.push(RawLiteral::Bareword(&interior[pos..end]));
        if end >= bytes.len() {
            break;
        }
        pos = end + 1;
    }

    literals
}

fn is_null_keyword(rest: &str) -> bool {
    let Some(head) = rest.get(..4) else {
        return false;
    };
    if !head.eq_ignore_ascii_case("null") {
        return false;
    }
    !rest[4..]
        .chars()
        .next()
        .is_some_and(|c| c.is_alphanumeric() || c == '_')
}

// Index just past the next ',' at or after `from`, or the end of the tuple.
// Quotes are not tracked here, so junk like `'a' 'x,y'` splits at the inner comma.
fn past_next_comma(bytes: &[u8], from: usize) -> usize {
    bytes[from.min(bytes.len())..]
        .iter()
        .position(|&b| b == b',')
        .map_or(bytes.len(), |n| from + n + 1)
}

// Position of the quote that terminates the literal opened at `open`.
// A backslash escapes the next byte and a doubled quote is a literal quote.
fn closing_quote(bytes: &[u8], open: usize) -> Option<usize> {
    let quote = bytes[open];
    let mut i = open + 1;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'\\' {
            i += 2;
            continue;
        }
        if b == quote {
            if bytes.get(i + 1) == Some(&quote) {
                i += 2;
                continue;
            }
            return Some(i);
        }
        i += 1;
    }
    None
}

// End of an unquoted literal: the next comma outside quotes and parentheses.
// Backtick identifiers have no escapes, same as in the statement scanner.
fn bareword_end(bytes: &[u8], start: usize) -> usize {
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut i = start;
    while i < bytes.len() {
        let b = bytes[i];
        if let Some(q) = quote {
            if b == b'\\' && q != b'`' {
                i += 2;
                continue;
            }
            if b == q {
                quote = None;
            }
        } else {
            match b {
                b'\'' | b'"' | b'`' => quote = Some(b),
                b'(' => depth += 1,
                b')' => depth = depth.saturating_sub(1),
                b',' if depth == 0 => return i,
                _ => {}
            }
        }
        i += 1;
    }
    bytes.len()
}

/// Turn one raw literal into a typed value. Never fails.
pub fn coerce(literal: &RawLiteral<'_>) -> Value {
    match literal {
        RawLiteral::Null => Value::Null,
        RawLiteral::Quoted {
            raw,
            quote,
            terminated,
        } => {
            let open = quote.len_utf8();
            let body = if *terminated {
                &raw[open..raw.len() - open]
            } else {
                &raw[open..]
            };
            Value::Text(sanitize_text(&unescape(body, *quote)))
        }
        RawLiteral::Bareword(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Value::Null;
            }
            parse_number(text).unwrap_or_else(|| Value::Text(sanitize_text(text)))
        }
    }
}

// Collapse doubled quotes and backslash escapes of quotes/backslashes.
// Other backslash sequences (\n, \t, ...) are kept verbatim.
fn unescape(body: &str, quote: char) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if next == '\\' || next == '\'' || next == '"' {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        } else if c == quote && chars.peek() == Some(&quote) {
            chars.next();
        }
        out.push(c);
    }
    out
}

// Try order: a literal '.' means float, otherwise integer then float.
fn parse_number(text: &str) -> Option<Value> {
    let numeric_shape = text.bytes().any(|b| b.is_ascii_digit())
        && text
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    if !numeric_shape {
        return None;
    }
    let float = || {
        text.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(Value::Float)
    };
    if text.contains('.') {
        float()
    } else {
        text.parse::<i64>().ok().map(Value::Integer).or_else(float)
    }
}

/// Drop every character in Unicode general category C (controls, format
/// characters such as zero-width and bidi marks, private use, unassigned),
/// except `\n`, `\r` and `\t`.
pub fn sanitize_text(text: &str) -> String {
    text.chars()
        .filter(|&c| matches!(c, '\n' | '\r' | '\t') || !is_other_category(c))
        .collect()
}

fn is_other_category(c: char) -> bool {
    matches!(
        get_general_category(c),
        GeneralCategory::Control
            | GeneralCategory::Format
            | GeneralCategory::Surrogate
            | GeneralCategory::PrivateUse
            | GeneralCategory::Unassigned
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(interior: &str) -> Vec<Value> {
        lex_tuple(interior).iter().map(coerce).collect()
    }

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    #[test]
    fn lexes_mixed_literals() {
        let lits = lex_tuple(" 1, 'a, b', NULL , \"x\"");
        assert_eq!(
            lits,
            vec![
                RawLiteral::Bareword("1"),
                RawLiteral::Quoted {
                    raw: "'a, b'",
                    quote: '\'',
                    terminated: true
                },
                RawLiteral::Null,
                RawLiteral::Quoted {
                    raw: "\"x\"",
                    quote: '"',
                    terminated: true
                },
            ]
        );
    }

    #[test]
    fn empty_interior_has_no_literals() {
        assert!(lex_tuple("").is_empty());
        assert!(lex_tuple("   ").is_empty());
    }

    #[test]
    fn consecutive_commas_yield_null() {
        assert_eq!(values("1,,2"), vec![Value::Integer(1), Value::Null, Value::Integer(2)]);
    }

    #[test]
    fn null_keyword_is_case_insensitive_and_whole_word() {
        assert_eq!(values("null, Null, NULL"), vec![Value::Null; 3]);
        assert_eq!(values("NULLABLE"), vec![text("NULLABLE")]);
        assert_eq!(values("null_flag"), vec![text("null_flag")]);
    }

    #[test]
    fn doubled_and_backslash_quotes_unescape() {
        assert_eq!(values("'it''s'"), vec![text("it's")]);
        assert_eq!(values(r"'a\'b'"), vec![text("a'b")]);
        assert_eq!(values(r#""say ""hi""""#), vec![text("say \"hi\"")]);
        assert_eq!(values(r"'C:\\dir\\'"), vec![text(r"C:\dir\")]);
    }

    #[test]
    fn other_backslash_sequences_are_kept() {
        assert_eq!(values(r"'line\nnext'"), vec![text(r"line\nnext")]);
    }

    #[test]
    fn embedded_json_survives() {
        let got = values(r#"2118, '{\"k\": \"v, w\"}', NULL"#);
        assert_eq!(got, vec![Value::Integer(2118), text(r#"{"k": "v, w"}"#), Value::Null]);
    }

    #[test]
    fn empty_quoted_string_is_text_not_null() {
        assert_eq!(values("'', \"\""), vec![text(""), text("")]);
    }

    #[test]
    fn quoted_numbers_stay_text() {
        assert_eq!(values("'42', \"1.5\""), vec![text("42"), text("1.5")]);
    }

    #[test]
    fn barewords_coerce_to_numbers() {
        assert_eq!(
            values("42, -7, +3, 1.5, 2e3, .5"),
            vec![
                Value::Integer(42),
                Value::Integer(-7),
                Value::Integer(3),
                Value::Float(1.5),
                Value::Float(2000.0),
                Value::Float(0.5),
            ]
        );
    }

    #[test]
    fn out_of_range_integer_falls_back_to_float() {
        assert_eq!(values("99999999999999999999"), vec![Value::Float(1e20)]);
    }

    #[test]
    fn unrecognized_barewords_degrade_to_text() {
        assert_eq!(
            values("0x1F, TRUE, inf, NaN, 1.2.3, 1e999"),
            vec![text("0x1F"), text("TRUE"), text("inf"), text("NaN"), text("1.2.3"), text("1e999")]
        );
    }

    #[test]
    fn function_call_bareword_keeps_its_commas() {
        assert_eq!(values("NOW(), CONCAT('a', 'b'), 3"), vec![
            text("NOW()"),
            text("CONCAT('a', 'b')"),
            Value::Integer(3),
        ]);
    }

    #[test]
    fn unterminated_quote_takes_the_tail() {
        let lits = lex_tuple("1, 'abc, def");
        assert_eq!(lits[1], RawLiteral::Quoted {
            raw: "'abc, def",
            quote: '\'',
            terminated: false,
        });
        assert_eq!(values("1, 'abc, def"), vec![Value::Integer(1), text("abc, def")]);
    }

    #[test]
    fn junk_after_quoted_literal_is_skipped() {
        assert_eq!(values("'a' junk, 2"), vec![text("a"), Value::Integer(2)]);
    }

    #[test]
    fn trailing_comma_adds_nothing() {
        assert_eq!(values("1,"), vec![Value::Integer(1)]);
    }

    #[test]
    fn sanitize_strips_controls_and_zero_width() {
        assert_eq!(sanitize_text("a\u{200B}b\u{FEFF}c\u{0007}d\u{009F}e"), "abcde");
        assert_eq!(sanitize_text("keep\n\r\tthese"), "keep\n\r\tthese");
        assert_eq!(values("'x\u{200C}y\u{200D}z'"), vec![text("xyz")]);
    }

    #[test]
    fn sanitize_strips_format_and_private_use() {
        assert_eq!(sanitize_text("a\u{202E}b\u{2060}c\u{00AD}d\u{200E}e"), "abcde");
        assert_eq!(sanitize_text("x\u{E000}y\u{10FFFF}z"), "xyz");
        assert_eq!(sanitize_text("naïve 名字 ✓"), "naïve 名字 ✓");
    }

    #[test]
    fn backtick_bareword_keeps_its_comma() {
        assert_eq!(values("`x,y`, 1"), vec![text("`x,y`"), Value::Integer(1)]);
    }

    #[test]
    fn junk_after_quoted_literal_is_not_quote_aware() {
        assert_eq!(values("'a' 'x,y', 2"), vec![text("a"), text("y', 2")]);
    }
}
