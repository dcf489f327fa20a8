// Table export: CSV, Markdown and a JSON preview of parsed records.
// Records from different tables can have different keys, so the exported
// column set is the union of all keys in first-seen order.

use crate::error::{ConvertError, Result};
use crate::parser::{Record, Value};
use indexmap::IndexSet;
use serde::Serialize;
use std::io::Write;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Csv,
    #[value(name = "md", alias = "markdown")]
    Markdown,
    /// JSON preview of the first rows.
    Json,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Markdown => "md",
            OutputFormat::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "md" | "markdown" => Ok(OutputFormat::Markdown),
            "json" => Ok(OutputFormat::Json),
            _ => Err(ConvertError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Rectangular view over records.
#[derive(Debug)]
pub struct Table<'a> {
    pub columns: Vec<&'a str>,
    records: &'a [Record],
}

impl<'a> Table<'a> {
    pub fn from_records(records: &'a [Record]) -> Self {
        let columns: IndexSet<&str> = records
            .iter()
            .flat_map(|r| r.keys().map(String::as_str))
            .collect();
        Self {
            columns: columns.into_iter().collect(),
            records,
        }
    }

    // Cells of one row in column order; absent keys render empty.
    fn cells(&self, record: &'a Record) -> impl Iterator<Item = String> + '_ {
        self.columns
            .iter()
            .map(move |col| record.get(*col).map(Value::to_string).unwrap_or_default())
    }
}

pub fn write_csv<W: Write>(table: &Table<'_>, out: &mut W) -> Result<()> {
    let header: Vec<String> = table.columns.iter().map(|c| csv_field(c)).collect();
    writeln!(out, "{}", header.join(","))?;
    for record in table.records {
        let row: Vec<String> = table.cells(record).map(|c| csv_field(&c)).collect();
        writeln!(out, "{}", row.join(","))?;
    }
    Ok(())
}

fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

pub fn write_markdown<W: Write>(table: &Table<'_>, out: &mut W) -> Result<()> {
    let header: Vec<String> = table.columns.iter().map(|c| md_cell(c)).collect();
    writeln!(out, "| {} |", header.join(" | "))?;
    let sep: Vec<&str> = table.columns.iter().map(|_| "---").collect();
    writeln!(out, "| {} |", sep.join(" | "))?;
    for record in table.records {
        let row: Vec<String> = table.cells(record).map(|c| md_cell(&c)).collect();
        writeln!(out, "| {} |", row.join(" | "))?;
    }
    Ok(())
}

fn md_cell(s: &str) -> String {
    s.replace('|', "\\|")
        .replace("\r\n", "<br>")
        .replace(['\n', '\r'], "<br>")
}

/// First rows of a parse, for showing before a full export.
#[derive(Debug, Serialize)]
pub struct Preview<'a> {
    pub preview: &'a [Record],
    pub columns: Vec<&'a str>,
    pub total_rows: usize,
}

pub fn preview(records: &[Record], max_rows: usize) -> Preview<'_> {
    let shown = &records[..records.len().min(max_rows)];
    let columns: Vec<&str> = shown
        .first()
        .map(|r| r.keys().map(String::as_str).collect())
        .unwrap_or_default();
    Preview {
        preview: shown,
        columns,
        total_rows: records.len(),
    }
}

pub fn write_preview<W: Write>(records: &[Record], max_rows: usize, out: &mut W) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, &preview(records, max_rows))?;
    writeln!(out)?;
    Ok(())
}

// Render records in `format` into `out`.
pub fn render<W: Write>(
    records: &[Record],
    format: OutputFormat,
    preview_rows: usize,
    out: &mut W,
) -> Result<()> {
    match format {
        OutputFormat::Csv => write_csv(&Table::from_records(records), out),
        OutputFormat::Markdown => write_markdown(&Table::from_records(records), out),
        OutputFormat::Json => write_preview(records, preview_rows, out),
    }
}
