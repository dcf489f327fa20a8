//! Tolerant extraction of table rows from SQL dump text.
//!
//! [`parser::parse_sql`] turns `CREATE TABLE` / `INSERT INTO ... VALUES`
//! text into ordered records without a SQL engine: column names come from
//! the statement, a preceding `CREATE TABLE`, or positional inference, and
//! every literal is coerced to a [`Value`]. [`export`] renders records as
//! CSV, Markdown or a JSON preview; [`converter`] runs that over files.

pub mod converter;
pub mod error;
pub mod export;
pub mod logger;
pub mod parser;
pub mod progress;

pub use error::{ConvertError, Result};
pub use parser::{
    ParseOutcome, Record, SkipReason, SkippedStatement, Value, parse_records_strict, parse_sql,
    parse_sql_with_diagnostics,
};
