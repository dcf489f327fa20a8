// Low-level text scanning shared by the schema and INSERT parsers.
// Every delimiter we care about is ASCII, so we walk bytes and only slice
// the source at ASCII positions (always valid char boundaries).

// Result of looking for the parenthesis that closes an opening one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Balance {
    // Index of the matching ')'.
    Closed(usize),
    // A ';' was reached at depth > 0; index just past it.
    Semicolon(usize),
    // End of text reached with depth > 0 outside any quote.
    Eof,
    // End of text reached inside a quoted string.
    OpenQuote,
}

pub(crate) fn skip_whitespace(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
        pos += 1;
    }
    pos
}

// Find the ')' matching the '(' at `open`, ignoring parentheses inside
// quoted strings and backtick identifiers.
pub(crate) fn matching_paren(bytes: &[u8], open: usize) -> Balance {
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut i = open;
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
            i += 1;
            continue;
        }
        match b {
            b'\'' | b'"' | b'`' => quote = Some(b),
            b'(' => depth += 1,
            b')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Balance::Closed(i);
                }
            }
            b';' if depth > 0 => return Balance::Semicolon(i + 1),
            _ => {}
        }
        i += 1;
    }
    if quote.is_some() {
        Balance::OpenQuote
    } else {
        Balance::Eof
    }
}

// Split on `sep` where it appears outside quotes and at paren depth 0.
pub(crate) fn split_top_level(text: &str, sep: u8) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut start = 0;
    let mut i = 0;
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
                _ if b == sep && depth == 0 => {
                    parts.push(&text[start..i]);
                    start = i + 1;
                }
                _ => {}
            }
        }
        i += 1;
    }
    parts.push(&text[start..]);
    parts
}

// Read a (possibly schema-qualified) table identifier starting at `pos`.
// Accepts `quoted`, "quoted" or bare names; for `db`.`t` the last part wins.
// Returns the name and the index just past it.
pub(crate) fn read_table_name(text: &str, pos: usize) -> Option<(String, usize)> {
    let (mut name, mut end) = read_identifier(text, pos)?;
    let bytes = text.as_bytes();
    while end < bytes.len() && bytes[end] == b'.' {
        let (part, next) = read_identifier(text, end + 1)?;
        name = part;
        end = next;
    }
    Some((name, end))
}

fn read_identifier(text: &str, pos: usize) -> Option<(String, usize)> {
    let rest = text.get(pos..)?;
    let first = rest.chars().next()?;
    if first == '`' || first == '"' {
        let close = rest[1..].find(first)? + 1;
        let name = &rest[1..close];
        if name.is_empty() {
            return None;
        }
        return Some((name.to_string(), pos + close + 1));
    }
    let len: usize = rest
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == '$')
        .map(char::len_utf8)
        .sum();
    if len == 0 {
        return None;
    }
    Some((rest[..len].to_string(), pos + len))
}

// Remove `-- line` and `/* block */` comments. Comment markers inside quoted
// strings or backtick identifiers are kept as text.
pub fn strip_comments(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut quote: Option<u8> = None;
    let mut copied = 0;
    let mut i = 0;
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
            i += 1;
            continue;
        }
        match b {
            b'\'' | b'"' | b'`' => {
                quote = Some(b);
                i += 1;
            }
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                out.push_str(&text[copied..i]);
                let end = text[i..].find('\n').map_or(bytes.len(), |n| i + n);
                i = end;
                copied = end;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                out.push_str(&text[copied..i]);
                let end = text[i + 2..].find("*/").map_or(bytes.len(), |n| i + 2 + n + 2);
                out.push(' ');
                i = end;
                copied = end;
            }
            _ => i += 1,
        }
    }
    // A trailing backslash inside a quote can step past the end.
    if copied < bytes.len() {
        out.push_str(&text[copied..]);
    }
    out
}
