// INSERT parser: locates INSERT INTO statements and expands every value
// group into a record. We intentionally keep parsing simple (no full SQL
// grammar); a statement we cannot make sense of is skipped on its own and
// scanning resumes after it.

use crate::logger;
use crate::parser::scan::{self, Balance};
use crate::parser::values::{coerce, lex_tuple};
use crate::parser::{ParseOutcome, Record, Schema, SkipReason, SkippedStatement, Value};
use regex::Regex;

pub struct InsertParser {
    insert_re: Regex,
    values_re: Regex,
}

// One INSERT statement, split but not yet coerced.
#[derive(Debug)]
struct InsertStatement<'a> {
    table: String,
    columns: Vec<String>,
    groups: Vec<&'a str>,
    // Unparsed text followed the last value group.
    trailing: bool,
    // Index just past the statement (and its ';', if any).
    end: usize,
}

#[derive(Debug)]
struct Skip {
    table: Option<String>,
    reason: SkipReason,
    resume: usize,
}

impl Default for InsertParser {
    fn default() -> Self {
        Self::new()
    }
}

impl InsertParser {
    pub fn new() -> Self {
        let insert_re =
            Regex::new(r"(?i)\bINSERT\s+(?:IGNORE\s+)?INTO\s+").expect("valid insert regex");
        let values_re = Regex::new(r"(?i)^\s*VALUES\b").expect("valid values regex");
        Self {
            insert_re,
            values_re,
        }
    }

    // Expand every INSERT in (comment-free) text into records, in source order.
    // Tables without a schema get positional columns from their first tuple,
    // which are then remembered in `schema` for later statements.
    pub fn parse_text(&self, text: &str, schema: &mut Schema) -> ParseOutcome {
        let mut outcome = ParseOutcome::default();
        let mut pos = 0;
        let mut statements = 0usize;

        while let Some(m) = self.insert_re.find_at(text, pos) {
            match self.split_statement(text, m.end()) {
                Ok(stmt) => {
                    statements += 1;
                    logger::debug(&format!(
                        "ExpandInsert: {} has {} value groups",
                        stmt.table,
                        stmt.groups.len()
                    ));
                    for group in &stmt.groups {
                        let values: Vec<Value> = lex_tuple(group).iter().map(coerce).collect();
                        let columns = resolve_columns(&stmt.columns, schema, &stmt.table, values.len());
                        outcome.records.push(assemble_record(columns, values));
                    }
                    if stmt.trailing {
                        logger::debug(&format!(
                            "ExpandInsert: unparsed text after value groups of {} at byte {}",
                            stmt.table, stmt.end
                        ));
                        outcome.skipped.push(SkippedStatement {
                            offset: m.start(),
                            table: Some(stmt.table.clone()),
                            reason: SkipReason::TrailingText,
                        });
                    }
                    pos = stmt.end;
                }
                Err(skip) => {
                    logger::debug(&format!(
                        "ExpandInsert: skipping statement at byte {} ({}): {}",
                        m.start(),
                        skip.table.as_deref().unwrap_or("?"),
                        skip.reason
                    ));
                    outcome.skipped.push(SkippedStatement {
                        offset: m.start(),
                        table: skip.table,
                        reason: skip.reason,
                    });
                    pos = skip.resume;
                }
            }
        }

        logger::debug(&format!("ParseInserts: processed {statements} statements"));
        outcome
    }

    // Split one statement starting right after `INSERT INTO `.
    fn split_statement<'a>(&self, text: &'a str, start: usize) -> Result<InsertStatement<'a>, Skip> {
        let bytes = text.as_bytes();
        let Some((table, after_name)) = scan::read_table_name(text, start) else {
            return Err(Skip {
                table: None,
                reason: SkipReason::MissingTable,
                resume: start,
            });
        };
        let skip = |reason, resume| Skip {
            table: Some(table.clone()),
            reason,
            resume,
        };

        // Optional explicit column list.
        let mut pos = scan::skip_whitespace(bytes, after_name);
        let mut columns = Vec::new();
        if bytes.get(pos) == Some(&b'(') {
            let close = match scan::matching_paren(bytes, pos) {
                Balance::Closed(close) => close,
                Balance::Semicolon(resume) => return Err(skip(SkipReason::UnbalancedParens, resume)),
                Balance::Eof | Balance::OpenQuote => {
                    return Err(skip(SkipReason::UnbalancedParens, after_name));
                }
            };
            columns = parse_column_list(&text[pos + 1..close]);
            pos = close + 1;
        }

        let Some(values_kw) = self.values_re.find(&text[pos..]) else {
            return Err(skip(SkipReason::MissingValues, pos));
        };
        let values_end = pos + values_kw.end();
        pos = values_end;

        // Value groups: (...), (...), ... until anything but a comma follows.
        let mut groups = Vec::new();
        loop {
            pos = scan::skip_whitespace(bytes, pos);
            if bytes.get(pos) != Some(&b'(') {
                break;
            }
            match scan::matching_paren(bytes, pos) {
                Balance::Closed(close) => {
                    groups.push(&text[pos + 1..close]);
                    pos = scan::skip_whitespace(bytes, close + 1);
                }
                Balance::Semicolon(resume) => return Err(skip(SkipReason::UnbalancedParens, resume)),
                // Unterminated string: the group runs to the next raw ';' and
                // the lexer keeps the open literal as the last value.
                Balance::OpenQuote => {
                    let cut = text[pos..].find(';').map_or(bytes.len(), |n| pos + n);
                    let tail = text[pos + 1..cut].trim_end();
                    groups.push(tail.strip_suffix(')').unwrap_or(tail));
                    pos = cut;
                    break;
                }
                Balance::Eof => return Err(skip(SkipReason::UnbalancedParens, values_end)),
            }
            if bytes.get(pos) != Some(&b',') {
                break;
            }
            pos += 1;
        }

        // Another statement or clause (ON DUPLICATE KEY ...) may follow;
        // anything else is text we could not place.
        let trailing = bytes
            .get(pos)
            .is_some_and(|&b| b != b';' && !b.is_ascii_alphabetic());
        if bytes.get(pos) == Some(&b';') {
            pos += 1;
        }
        Ok(InsertStatement {
            table,
            columns,
            groups,
            trailing,
            end: pos,
        })
    }
}

// Column names from an explicit list, with quoting stripped.
fn parse_column_list(col_str: &str) -> Vec<String> {
    scan::split_top_level(col_str, b',')
        .into_iter()
        .map(|col| col.trim().trim_matches(['`', '"']).trim())
        .filter(|col| !col.is_empty())
        .map(str::to_string)
        .collect()
}

// Explicit list first, then the table's schema, then column_1..column_n.
fn resolve_columns<'a>(
    explicit: &'a [String],
    schema: &'a mut Schema,
    table: &str,
    value_count: usize,
) -> &'a [String] {
    if !explicit.is_empty() {
        return explicit;
    }
    if !schema.contains_key(table) {
        if value_count == 0 {
            return &[];
        }
        logger::debug(&format!(
            "ExpandInsert: no columns for {table}, inferring {value_count} positional columns"
        ));
        schema.insert(table.to_string(), positional_columns(value_count));
    }
    &schema[table]
}

fn positional_columns(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("column_{i}")).collect()
}

// Pad with NULL or truncate so the values line up with the columns.
// A repeated column name keeps its first position and its last value.
fn assemble_record(columns: &[String], mut values: Vec<Value>) -> Record {
    if values.len() != columns.len() {
        logger::debug(&format!(
            "ExpandInsert: value count mismatch (expected {}, got {})",
            columns.len(),
            values.len()
        ));
        values.resize(columns.len(), Value::Null);
    }
    columns.iter().cloned().zip(values).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str) -> (ParseOutcome, Schema) {
        let mut schema = Schema::new();
        let outcome = InsertParser::new().parse_text(text, &mut schema);
        (outcome, schema)
    }

    fn keys(record: &Record) -> Vec<&str> {
        record.keys().map(String::as_str).collect()
    }

    #[test]
    fn expands_multiple_value_groups() {
        let (outcome, _) = run("INSERT INTO `t` (`a`, `b`) VALUES (1,'x'),\n (2, 'y');");
        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.records[0]["a"], Value::Integer(1));
        assert_eq!(outcome.records[1]["b"], Value::Text("y".into()));
    }

    #[test]
    fn explicit_columns_beat_schema() {
        let mut schema = Schema::new();
        schema.insert("t".into(), vec!["x".into(), "y".into(), "z".into()]);
        let outcome = InsertParser::new().parse_text("INSERT INTO t (a, b) VALUES (1, 2);", &mut schema);
        assert_eq!(keys(&outcome.records[0]), vec!["a", "b"]);
    }

    #[test]
    fn positional_columns_carry_to_later_statements() {
        let (outcome, schema) = run("INSERT INTO t VALUES (1, 2, 3);\nINSERT INTO t VALUES (4, 5);");
        assert_eq!(schema["t"], vec!["column_1", "column_2", "column_3"]);
        assert_eq!(keys(&outcome.records[1]), vec!["column_1", "column_2", "column_3"]);
        assert_eq!(outcome.records[1]["column_3"], Value::Null);
    }

    #[test]
    fn duplicate_column_keeps_last_value() {
        let (outcome, _) = run("INSERT INTO t (a, b, a) VALUES (1, 2, 3);");
        let record = &outcome.records[0];
        assert_eq!(keys(record), vec!["a", "b"]);
        assert_eq!(record["a"], Value::Integer(3));
    }

    #[test]
    fn nested_parens_do_not_split_groups() {
        let (outcome, _) = run("INSERT INTO t (a, b) VALUES (POINT(1, 2), '(x)'), (NOW(), ')(');");
        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.records[0]["a"], Value::Text("POINT(1, 2)".into()));
        assert_eq!(outcome.records[1]["b"], Value::Text(")(".into()));
    }

    #[test]
    fn insert_ignore_and_lowercase_keywords() {
        let (outcome, _) = run("insert ignore into t(a) values(7);");
        assert_eq!(outcome.records[0]["a"], Value::Integer(7));
    }

    #[test]
    fn missing_semicolon_ends_at_next_statement() {
        let (outcome, _) = run("INSERT INTO t (a) VALUES (1)\nINSERT INTO t (a) VALUES (2);");
        assert_eq!(outcome.records.len(), 2);
        assert!(outcome.skipped.is_empty());
    }

    #[test]
    fn unbalanced_group_skips_only_its_statement() {
        let text = "INSERT INTO t (a) VALUES (1);\nINSERT INTO t (a) VALUES (2, (3);\nINSERT INTO t (a) VALUES (4);";
        let (outcome, _) = run(text);
        let got: Vec<&Value> = outcome.records.iter().map(|r| &r["a"]).collect();
        assert_eq!(got, vec![&Value::Integer(1), &Value::Integer(4)]);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].reason, SkipReason::UnbalancedParens);
    }

    #[test]
    fn unterminated_quote_does_not_swallow_later_statements() {
        let text = "INSERT INTO t (a) VALUES ('oops);\nINSERT INTO u (b) VALUES (5);";
        let (outcome, _) = run(text);
        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.records[0]["a"], Value::Text("oops".into()));
        assert_eq!(outcome.records[1]["b"], Value::Integer(5));
        assert!(outcome.skipped.is_empty());
    }

    #[test]
    fn unterminated_quote_keeps_earlier_groups() {
        let (outcome, _) = run("INSERT INTO t (a,b) VALUES (1,'x'),(2,'y'),(3,'oops);");
        assert_eq!(outcome.records.len(), 3);
        assert_eq!(outcome.records[1]["b"], Value::Text("y".into()));
        assert_eq!(outcome.records[2]["a"], Value::Integer(3));
        assert_eq!(outcome.records[2]["b"], Value::Text("oops".into()));
        assert!(outcome.skipped.is_empty());
    }

    #[test]
    fn unplaced_text_after_groups_is_reported() {
        for text in ["INSERT INTO t (a) VALUES (1) (2);", "INSERT INTO t (a) VALUES (1)), (2);"] {
            let (outcome, _) = run(text);
            assert_eq!(outcome.records.len(), 1);
            assert_eq!(outcome.records[0]["a"], Value::Integer(1));
            assert_eq!(outcome.skipped.len(), 1);
            assert_eq!(outcome.skipped[0].reason, SkipReason::TrailingText);
        }
    }

    #[test]
    fn following_clause_or_statement_is_not_reported() {
        let text = "INSERT INTO t (a) VALUES (1) ON DUPLICATE KEY UPDATE a=1;\nINSERT INTO t (a) VALUES (2)\nINSERT INTO t (a) VALUES (3)";
        let (outcome, _) = run(text);
        assert_eq!(outcome.records.len(), 3);
        assert!(outcome.skipped.is_empty());
    }

    #[test]
    fn missing_table_name_is_reported() {
        let (outcome, _) = run("INSERT INTO (a) VALUES (1);");
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.skipped[0].reason, SkipReason::MissingTable);
    }

    #[test]
    fn empty_tuple_without_schema_yields_empty_record() {
        let (outcome, schema) = run("INSERT INTO t VALUES ();");
        assert_eq!(outcome.records.len(), 1);
        assert!(outcome.records[0].is_empty());
        assert!(schema.is_empty());
    }

    #[test]
    fn column_list_strips_quotes() {
        assert_eq!(parse_column_list(" `a`, \"b c\" ,d,"), vec!["a", "b c", "d"]);
    }
}
