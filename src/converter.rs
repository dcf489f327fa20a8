// Conversion pipeline: read SQL dump files, extract records, render them.
// Files are independent, so they are converted on a rayon pool; a failing
// file is reported and never stops the others.

use crate::error::{ConvertError, Result};
use crate::export::{self, OutputFormat};
use crate::logger;
use crate::parser;
use crate::progress::ProgressManager;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

// Default input ceiling (50 MiB), the same limit uploads are held to.
pub const DEFAULT_MAX_INPUT_BYTES: u64 = 50 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub format: OutputFormat,
    // None renders into the report instead of writing a file.
    pub output_dir: Option<PathBuf>,
    pub preview_rows: usize,
    pub max_input_bytes: u64,
    // 0 = number of CPUs.
    pub workers: usize,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Csv,
            output_dir: None,
            preview_rows: 5,
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            workers: 0,
        }
    }
}

#[derive(Debug)]
pub struct FileReport {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub rows: usize,
    pub columns: usize,
    pub skipped: Vec<parser::SkippedStatement>,
    // Rendered output when no output directory is configured.
    pub rendered: Option<Vec<u8>>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Summary {
    pub files_converted: usize,
    pub files_failed: usize,
    pub rows: usize,
    pub skipped_statements: usize,
}

pub struct Converter {
    options: ConvertOptions,
}

impl Converter {
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    // Convert one file end to end.
    pub fn convert_file(&self, path: &Path) -> Result<FileReport> {
        let start = Instant::now();
        let size = fs::metadata(path)?.len();
        if size > self.options.max_input_bytes {
            return Err(ConvertError::InputTooLarge {
                path: path.to_path_buf(),
                size,
                limit: self.options.max_input_bytes,
            });
        }

        let bytes = fs::read(path)?;
        let sql = String::from_utf8(bytes).map_err(|_| ConvertError::Utf8 {
            path: path.to_path_buf(),
        })?;
        logger::debug(&format!("ConvertFile: {} ({} bytes)", path.display(), size));

        let outcome = parser::parse_sql_with_diagnostics(&sql);
        if outcome.records.is_empty() {
            return Err(ConvertError::NoData);
        }
        for skip in &outcome.skipped {
            logger::info(&format!(
                "{}: skipped INSERT into {} at byte {}: {}",
                path.display(),
                skip.table.as_deref().unwrap_or("?"),
                skip.offset,
                skip.reason
            ));
        }

        let columns = export::Table::from_records(&outcome.records).columns.len();
        let mut rendered = Vec::new();
        export::render(
            &outcome.records,
            self.options.format,
            self.options.preview_rows,
            &mut rendered,
        )?;

        let (output, rendered) = match &self.options.output_dir {
            Some(dir) => {
                fs::create_dir_all(dir)?;
                let out_path = output_path(dir, path, self.options.format);
                fs::write(&out_path, &rendered)?;
                (Some(out_path), None)
            }
            None => (None, Some(rendered)),
        };

        logger::debug(&format!(
            "ConvertFile: {} -> {} rows, {} columns in {:?}",
            path.display(),
            outcome.records.len(),
            columns,
            start.elapsed()
        ));
        Ok(FileReport {
            input: path.to_path_buf(),
            output,
            rows: outcome.records.len(),
            columns,
            skipped: outcome.skipped,
            rendered,
        })
    }

    // Convert many files in parallel. Results keep the input order.
    pub fn convert_all(
        &self,
        paths: &[PathBuf],
        progress: &ProgressManager,
    ) -> Result<(Vec<Result<FileReport>>, Summary)> {
        let worker_count = if self.options.workers > 0 {
            self.options.workers
        } else {
            num_cpus::get()
        };
        logger::debug(&format!(
            "ConvertAll: {} files on {} workers",
            paths.len(),
            worker_count
        ));

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(worker_count)
            .build()?;
        let bar = progress.new_file_bar(paths.len() as u64);

        let results: Vec<Result<FileReport>> = pool.install(|| {
            paths
                .par_iter()
                .map(|path| {
                    let res = self.convert_file(path);
                    if let Err(e) = &res {
                        logger::error(&format!("{}: {}", path.display(), e));
                    }
                    if let Some(b) = &bar {
                        b.set_message(basename(path));
                        b.inc(1);
                    }
                    res
                })
                .collect()
        });

        if let Some(b) = bar {
            b.finish_and_clear();
        }

        let mut summary = Summary::default();
        for res in &results {
            match res {
                Ok(report) => {
                    summary.files_converted += 1;
                    summary.rows += report.rows;
                    summary.skipped_statements += report.skipped.len();
                }
                Err(_) => summary.files_failed += 1,
            }
        }
        Ok((results, summary))
    }
}

// <dir>/<input stem>.<ext>
fn output_path(dir: &Path, input: &Path, format: OutputFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("sql_data");
    dir.join(format!("{}.{}", stem, format.extension()))
}

fn basename(path: &Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_path_uses_stem_and_format_extension() {
        let p = output_path(Path::new("/out"), Path::new("/in/dump.sql"), OutputFormat::Markdown);
        assert_eq!(p, PathBuf::from("/out/dump.md"));
        let p = output_path(Path::new("out"), Path::new("rows.txt"), OutputFormat::Csv);
        assert_eq!(p, PathBuf::from("out/rows.csv"));
    }

    #[test]
    fn defaults_match_upload_limits() {
        let opts = ConvertOptions::default();
        assert_eq!(opts.max_input_bytes, 50 * 1024 * 1024);
        assert_eq!(opts.format, OutputFormat::Csv);
        assert_eq!(opts.preview_rows, 5);
    }
}
