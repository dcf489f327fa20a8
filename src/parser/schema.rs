// Schema parser: extracts ordered column lists from CREATE TABLE statements.
// These are the fallback column names for INSERTs that omit their own list.
// Only delimited leading identifiers (`col` or "col") count as columns, so
// index/key/constraint lines are skipped without a keyword list.

use crate::logger;
use crate::parser::Schema;
use crate::parser::scan::{self, Balance};
use regex::Regex;

pub struct SchemaParser {
    create_table_re: Regex,
    column_def_re: Regex,
}

impl Default for SchemaParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaParser {
    // Build regexes once for reuse.
    pub fn new() -> Self {
        let create_table_re = Regex::new(
            r"(?i)\bCREATE\s+(?:TEMPORARY\s+)?TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?",
        )
        .expect("valid create table regex");
        let column_def_re =
            Regex::new(r#"^(?:`([^`]+)`|"([^"]+)")"#).expect("valid column definition regex");
        Self {
            create_table_re,
            column_def_re,
        }
    }

    // Collect table -> columns for every CREATE TABLE in (comment-free) text.
    // A table defined twice keeps its last definition.
    pub fn parse_columns(&self, text: &str) -> Schema {
        let bytes = text.as_bytes();
        let mut columns_map = Schema::new();
        let mut tables_processed = 0usize;
        let mut pos = 0;

        while let Some(m) = self.create_table_re.find_at(text, pos) {
            pos = m.end();
            let Some((table, after_name)) = scan::read_table_name(text, m.end()) else {
                continue;
            };
            let open = scan::skip_whitespace(bytes, after_name);
            if bytes.get(open) != Some(&b'(') {
                logger::debug(&format!("ParseColumns: {table} has no column block"));
                continue;
            }
            let close = match scan::matching_paren(bytes, open) {
                Balance::Closed(close) => close,
                Balance::Semicolon(_) | Balance::Eof | Balance::OpenQuote => {
                    logger::debug(&format!("ParseColumns: unbalanced definition for {table}"));
                    continue;
                }
            };
            pos = close + 1;
            tables_processed += 1;

            let columns = self.column_names(&text[open + 1..close]);
            if columns.is_empty() {
                logger::debug(&format!("ParseColumns: no delimited columns in {table}"));
                continue;
            }
            logger::debug(&format!(
                "ParseColumns: Table {} columns extracted ({})",
                table,
                columns.len()
            ));
            columns_map.insert(table, columns);
        }

        logger::debug(&format!(
            "ParseColumns: Processed {} tables, extracted columns for {}",
            tables_processed,
            columns_map.len()
        ));
        columns_map
    }

    fn column_names(&self, body: &str) -> Vec<String> {
        scan::split_top_level(body, b',')
            .into_iter()
            .filter_map(|def| {
                let cap = self.column_def_re.captures(def.trim_start())?;
                cap.get(1).or_else(|| cap.get(2)).map(|m| m.as_str().to_string())
            })
            .collect()
    }
}
