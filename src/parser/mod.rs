// Parser module: schema (CREATE TABLE columns), INSERT scanning and value
// coercion, producing ordered records from raw SQL dump text.

pub mod insert;
pub mod scan;
pub mod schema;
pub mod values;

use crate::error::{ConvertError, Result};
use crate::logger;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt;

pub use scan::strip_comments;
pub use values::sanitize_text;

/// A typed cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    /// Sanitized text: no Unicode category C characters (controls, format,
    /// private use, unassigned) besides `\n`, `\r`, `\t`.
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

// Cell form used by the exporters: null is empty, numbers decimal, text as-is.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(x) if x.fract() == 0.0 => write!(f, "{x:.1}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl serde::Serialize for Value {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Float(x) => serializer.serialize_f64(*x),
            Value::Text(s) => serializer.serialize_str(s),
        }
    }
}

// Values arriving from JSON: composites are flattened to compact JSON text.
impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Text(b.to_string()),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => n.as_f64().map_or_else(|| Value::Text(n.to_string()), Value::Float),
            },
            serde_json::Value::String(s) => Value::Text(sanitize_text(&s)),
            composite => Value::Text(sanitize_text(&composite.to_string())),
        }
    }
}

/// One row: column name -> value, in column-list order.
pub type Record = IndexMap<String, Value>;

/// Table name (as written) -> ordered column names.
pub type Schema = HashMap<String, Vec<String>>;

/// Why an INSERT statement was skipped, in whole or in part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum SkipReason {
    /// No table name could be read after `INSERT INTO`.
    MissingTable,
    /// `VALUES` does not follow the table name / column list.
    MissingValues,
    /// A column list or value tuple never closed its parenthesis.
    UnbalancedParens,
    /// Text after the value groups could not be placed and was dropped;
    /// records from the groups before it are kept.
    TrailingText,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::MissingTable => "missing table name",
            SkipReason::MissingValues => "no VALUES clause",
            SkipReason::UnbalancedParens => "unbalanced parentheses",
            SkipReason::TrailingText => "unparsed text after value groups",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SkippedStatement {
    /// Byte offset of `INSERT` in the comment-stripped text.
    pub offset: usize,
    pub table: Option<String>,
    pub reason: SkipReason,
}

/// Records plus the statements that were skipped on the way.
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    pub records: Vec<Record>,
    pub skipped: Vec<SkippedStatement>,
}

/// Parse every INSERT tuple in `sql` into a record, in source order.
pub fn parse_sql(sql: &str) -> Vec<Record> {
    parse_sql_with_diagnostics(sql).records
}

/// Like [`parse_sql`], but fails with [`ConvertError::NoData`] when nothing
/// could be extracted.
pub fn parse_records_strict(sql: &str) -> Result<Vec<Record>> {
    let records = parse_sql(sql);
    if records.is_empty() {
        return Err(ConvertError::NoData);
    }
    Ok(records)
}

pub fn parse_sql_with_diagnostics(sql: &str) -> ParseOutcome {
    let cleaned = strip_comments(sql);

    let mut schema = schema::SchemaParser::new().parse_columns(&cleaned);
    logger::debug(&format!("ParseSql: {} table schemas found", schema.len()));

    let outcome = insert::InsertParser::new().parse_text(&cleaned, &mut schema);
    logger::debug(&format!(
        "ParseSql: {} records, {} skipped statements",
        outcome.records.len(),
        outcome.skipped.len()
    ));
    outcome
}
